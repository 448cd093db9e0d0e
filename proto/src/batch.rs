use serde::{Deserialize, Serialize};

use crate::{id::OperationId, operation::OperationEntry};

/// Path of the batch operations endpoint for a project.
pub fn operations_path(project_name: &str) -> String { format!("projects/{}/operations", project_name) }

/// Body of `POST projects/{project}/operations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub operations: Vec<OperationEntry>,
    /// When false the server applies all operations or none of them.
    pub can_fail: bool,
}

impl BatchRequest {
    pub fn all_or_nothing(operations: Vec<OperationEntry>) -> Self { Self { operations, can_fail: false } }

    pub fn entry(&self, id: &OperationId) -> Option<&OperationEntry> { self.operations.iter().find(|entry| entry.id == *id) }
}

/// Decoded body of a batch response.
///
/// `operations` is absent when the failure can't be attributed to a specific operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<OperationResult>>,
}

impl BatchResponse {
    /// First failed entry of the per-operation breakdown, in server order.
    pub fn first_failure(&self) -> Option<&OperationResult> { self.operations.as_ref()?.iter().find(|result| !result.success) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub id: OperationId,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    pub fn ok(id: OperationId) -> Self { Self { id, success: true, error: None } }

    pub fn failed(id: OperationId, error: impl Into<String>) -> Self { Self { id, success: false, error: Some(error.into()) } }
}
