use opbatch_proto::EntityId;

use crate::error::OperationError;

/// Anything a caller may pass where an existing entity id is expected.
///
/// Strings are parsed as UUIDs; a malformed id fails right away rather than at commit time.
pub trait IntoEntityId {
    fn into_entity_id(self) -> Result<EntityId, OperationError>;
}

impl IntoEntityId for EntityId {
    fn into_entity_id(self) -> Result<EntityId, OperationError> { Ok(self) }
}

impl IntoEntityId for &EntityId {
    fn into_entity_id(self) -> Result<EntityId, OperationError> { Ok(self.clone()) }
}

impl IntoEntityId for &str {
    fn into_entity_id(self) -> Result<EntityId, OperationError> { Ok(EntityId::parse(self)?) }
}

impl IntoEntityId for String {
    fn into_entity_id(self) -> Result<EntityId, OperationError> { Ok(EntityId::parse(&self)?) }
}

impl IntoEntityId for &String {
    fn into_entity_id(self) -> Result<EntityId, OperationError> { Ok(EntityId::parse(self)?) }
}
