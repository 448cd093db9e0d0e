use opbatch_proto::{EntityId, OperationEntry, OperationId, OperationKind};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{changes::ChangeSet, error::OperationError, id::IntoEntityId};

/// A single intended mutation of one entity in one project.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Create(CreateOperation),
    Update(UpdateOperation),
    Delete(DeleteOperation),
}

impl Operation {
    pub fn id(&self) -> OperationId {
        match self {
            Operation::Create(op) => op.id,
            Operation::Update(op) => op.id,
            Operation::Delete(op) => op.id,
        }
    }

    pub fn project_name(&self) -> &str {
        match self {
            Operation::Create(op) => &op.project_name,
            Operation::Update(op) => &op.project_name,
            Operation::Delete(op) => &op.project_name,
        }
    }

    pub fn entity_type(&self) -> &str {
        match self {
            Operation::Create(op) => &op.entity_type,
            Operation::Update(op) => &op.entity_type,
            Operation::Delete(op) => &op.entity_type,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        match self {
            Operation::Create(op) => op.entity_id.clone(),
            Operation::Update(op) => op.entity_id.clone(),
            Operation::Delete(op) => op.entity_id.clone(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Create(_) => OperationKind::Create,
            Operation::Update(_) => OperationKind::Update,
            Operation::Delete(_) => OperationKind::Delete,
        }
    }

    /// Introspection rendering, used for debugging and session dumps.
    pub fn to_data(&self) -> OperationData {
        match self {
            Operation::Create(op) => op.to_data(),
            Operation::Update(op) => op.to_data(),
            Operation::Delete(op) => op.to_data(),
        }
    }

    /// Wire rendering. `None` means the operation is a no-op and must not be submitted.
    pub fn to_server_operation(&self) -> Option<OperationEntry> {
        match self {
            Operation::Create(op) => Some(op.to_server_operation()),
            Operation::Update(op) => op.to_server_operation(),
            Operation::Delete(op) => Some(op.to_server_operation()),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}/{:#} in {}", self.id(), self.kind(), self.entity_type(), self.entity_id(), self.project_name())
    }
}

impl From<CreateOperation> for Operation {
    fn from(op: CreateOperation) -> Self { Operation::Create(op) }
}

impl From<UpdateOperation> for Operation {
    fn from(op: UpdateOperation) -> Self { Operation::Update(op) }
}

impl From<DeleteOperation> for Operation {
    fn from(op: DeleteOperation) -> Self { Operation::Delete(op) }
}

/// Introspection rendering of an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationData {
    pub id: OperationId,
    pub entity_type: String,
    pub project_name: String,
    pub operation: OperationKind,
    #[serde(flatten)]
    pub body: OperationDataBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationDataBody {
    Create { data: Map<String, Value> },
    Update { entity_id: EntityId, changes: Map<String, Value> },
    Delete { entity_id: EntityId },
}

/// Create a new entity from a payload.
///
/// The payload is owned by the operation. Its `id` field always holds the operation's entity id.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOperation {
    id: OperationId,
    project_name: String,
    entity_type: String,
    entity_id: EntityId,
    data: Map<String, Value>,
}

impl CreateOperation {
    /// Build a create operation. A missing `id` is generated; a present one must be a UUID string.
    pub fn new(project_name: impl Into<String>, entity_type: impl Into<String>, mut data: Map<String, Value>) -> Result<Self, OperationError> {
        let entity_id = match data.get("id") {
            Some(value) => EntityId::from_value(value)?,
            None => EntityId::new(),
        };
        data.insert("id".to_string(), Value::from(&entity_id));

        Ok(Self { id: OperationId::new(), project_name: project_name.into(), entity_type: entity_type.into(), entity_id, data })
    }

    pub fn id(&self) -> OperationId { self.id }
    pub fn project_name(&self) -> &str { &self.project_name }
    pub fn entity_type(&self) -> &str { &self.entity_type }
    pub fn entity_id(&self) -> EntityId { self.entity_id.clone() }
    pub fn data(&self) -> &Map<String, Value> { &self.data }

    pub fn get(&self, key: &str) -> Option<&Value> { self.data.get(key) }

    /// Set a payload field. The `id` field can't be changed after construction.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), OperationError> {
        let key = key.into();
        if key == "id" {
            return Err(OperationError::ImmutableEntityId);
        }
        self.data.insert(key, value.into());
        Ok(())
    }

    pub fn to_data(&self) -> OperationData {
        OperationData {
            id: self.id,
            entity_type: self.entity_type.clone(),
            project_name: self.project_name.clone(),
            operation: OperationKind::Create,
            body: OperationDataBody::Create { data: self.data.clone() },
        }
    }

    pub fn to_server_operation(&self) -> OperationEntry {
        OperationEntry {
            id: self.id,
            kind: OperationKind::Create,
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
            data: Some(self.data.clone()),
        }
    }
}

/// Change top-level fields of an existing entity.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOperation {
    id: OperationId,
    project_name: String,
    entity_type: String,
    entity_id: EntityId,
    changes: ChangeSet,
}

impl UpdateOperation {
    pub fn new(
        project_name: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl IntoEntityId,
        changes: ChangeSet,
    ) -> Result<Self, OperationError> {
        Ok(Self {
            id: OperationId::new(),
            project_name: project_name.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into_entity_id()?,
            changes,
        })
    }

    pub fn id(&self) -> OperationId { self.id }
    pub fn project_name(&self) -> &str { &self.project_name }
    pub fn entity_type(&self) -> &str { &self.entity_type }
    pub fn entity_id(&self) -> EntityId { self.entity_id.clone() }
    pub fn changes(&self) -> &ChangeSet { &self.changes }

    pub fn to_data(&self) -> OperationData {
        OperationData {
            id: self.id,
            entity_type: self.entity_type.clone(),
            project_name: self.project_name.clone(),
            operation: OperationKind::Update,
            body: OperationDataBody::Update { entity_id: self.entity_id.clone(), changes: self.changes.render() },
        }
    }

    /// `None` for an empty change-set.
    pub fn to_server_operation(&self) -> Option<OperationEntry> {
        if self.changes.is_empty() {
            return None;
        }
        Some(OperationEntry {
            id: self.id,
            kind: OperationKind::Update,
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
            data: Some(self.changes.render()),
        })
    }
}

/// Remove an existing entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOperation {
    id: OperationId,
    project_name: String,
    entity_type: String,
    entity_id: EntityId,
}

impl DeleteOperation {
    pub fn new(project_name: impl Into<String>, entity_type: impl Into<String>, entity_id: impl IntoEntityId) -> Result<Self, OperationError> {
        Ok(Self {
            id: OperationId::new(),
            project_name: project_name.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into_entity_id()?,
        })
    }

    pub fn id(&self) -> OperationId { self.id }
    pub fn project_name(&self) -> &str { &self.project_name }
    pub fn entity_type(&self) -> &str { &self.entity_type }
    pub fn entity_id(&self) -> EntityId { self.entity_id.clone() }

    pub fn to_data(&self) -> OperationData {
        OperationData {
            id: self.id,
            entity_type: self.entity_type.clone(),
            project_name: self.project_name.clone(),
            operation: OperationKind::Delete,
            body: OperationDataBody::Delete { entity_id: self.entity_id.clone() },
        }
    }

    pub fn to_server_operation(&self) -> OperationEntry {
        OperationEntry { id: self.id, kind: OperationKind::Delete, entity_type: self.entity_type.clone(), entity_id: self.entity_id.clone(), data: None }
    }
}
