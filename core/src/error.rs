//! Error types for opbatch-core.
//!
//! Construction problems surface as [`OperationError`] immediately; [`CommitError`] is only ever
//! returned from `OperationsSession::commit`.

use opbatch_proto::{DecodeError, OperationEntry, OperationId};
use thiserror::Error;

pub use crate::transport::TransportError;

/// Error building an operation or entity payload.
#[derive(Debug, Error)]
pub enum OperationError {
    /// A caller-supplied entity id is not a UUID
    #[error("invalid entity id: {0}")]
    InvalidEntityId(#[from] DecodeError),

    /// The `id` field of a create payload is fixed at construction
    #[error("entity id of a create operation can't be changed")]
    ImmutableEntityId,
}

/// Error committing a session.
///
/// Operations detached for the failing commit are not restored to the session. The server applies
/// each project batch all-or-nothing, but earlier projects of the same commit may have been applied.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The batch failed and the response doesn't point at a specific operation
    #[error("operations failed for project {project}. Content: {response}")]
    BatchFailed { project: String, response: serde_json::Value },

    /// A specific operation was rejected by the server
    #[error("operation \"{operation_id}\" failed with data:\n{}\nError: {error}.", render_payload(.payload))]
    OperationFailed { project: String, operation_id: OperationId, payload: Option<Box<OperationEntry>>, error: String },

    /// The batch body could not be encoded
    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),

    /// The transport could not deliver the batch
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CommitError {
    /// Id of the failing operation, if the server identified one
    pub fn operation_id(&self) -> Option<OperationId> {
        match self {
            Self::OperationFailed { operation_id, .. } => Some(*operation_id),
            _ => None,
        }
    }

    pub fn project(&self) -> Option<&str> {
        match self {
            Self::BatchFailed { project, .. } | Self::OperationFailed { project, .. } => Some(project),
            _ => None,
        }
    }
}

fn render_payload(payload: &Option<Box<OperationEntry>>) -> String {
    match payload {
        Some(entry) => serde_json::to_string_pretty(entry).unwrap_or_else(|_| entry.to_string()),
        None => "<not sent by this session>".to_string(),
    }
}

/// Error from the project create/delete helpers.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project with name \"{0}\" already exists")]
    AlreadyExists(String),

    #[error("project name \"{0}\" contains invalid characters")]
    InvalidName(String),

    #[error("project with name \"{0}\" was not found")]
    NotFound(String),

    #[error("failed to create project \"{name}\": {detail}")]
    CreateFailed { name: String, detail: String },

    #[error("failed to delete project \"{name}\": {detail}")]
    DeleteFailed { name: String, detail: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
