use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::DecodeError;

/// Identifier of an entity in the remote store.
///
/// Any UUID spelling is accepted on input (hyphenated, simple, braced, urn) and is rendered back
/// exactly as given. Generated ids render as the 32 character lowercase hex form. Equality, hashing
/// and ordering only look at the UUID value.
#[derive(Clone)]
pub struct EntityId {
    uuid: Uuid,
    spelling: Option<Arc<str>>,
}

impl EntityId {
    pub fn new() -> Self { Uuid::new_v4().into() }

    pub fn parse(input: &str) -> Result<Self, DecodeError> {
        match Uuid::parse_str(input) {
            Ok(uuid) => Ok(EntityId { uuid, spelling: Some(input.into()) }),
            Err(source) => Err(DecodeError::InvalidUuid { value: input.to_owned(), source }),
        }
    }

    /// Validate a JSON value as an entity id. Only strings are accepted.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, DecodeError> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            _ => Err(DecodeError::NotStringValue),
        }
    }

    pub fn as_uuid(&self) -> &Uuid { &self.uuid }

    /// The id in the 32 character lowercase hex form, regardless of how it was spelled.
    pub fn to_canonical(&self) -> String { self.uuid.simple().to_string() }

    pub fn to_short(&self) -> String {
        let value = self.to_canonical();
        value[value.len() - 6..].to_string()
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool { self.uuid == other.uuid }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) { self.uuid.hash(state) }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering { self.uuid.cmp(&other.uuid) }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return write!(f, "{}", self.to_short());
        }
        match &self.spelling {
            Some(spelling) => f.write_str(spelling),
            None => write!(f, "{}", self.uuid.simple()),
        }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "EntityId({})", self) }
}

impl Default for EntityId {
    fn default() -> Self { Self::new() }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self { EntityId { uuid, spelling: None } }
}

impl TryFrom<&str> for EntityId {
    type Error = DecodeError;
    fn try_from(id: &str) -> Result<Self, Self::Error> { Self::parse(id) }
}

impl TryFrom<String> for EntityId {
    type Error = DecodeError;
    fn try_from(id: String) -> Result<Self, Self::Error> { Self::parse(&id) }
}

impl TryFrom<&String> for EntityId {
    type Error = DecodeError;
    fn try_from(id: &String) -> Result<Self, Self::Error> { Self::parse(id) }
}

impl From<EntityId> for serde_json::Value {
    fn from(id: EntityId) -> Self { serde_json::Value::String(id.to_string()) }
}

impl From<&EntityId> for serde_json::Value {
    fn from(id: &EntityId) -> Self { serde_json::Value::String(id.to_string()) }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> { serializer.collect_str(self) }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EntityId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Process-unique identifier of a client-side operation.
///
/// Generated at construction and never reused. The server echoes it back in per-operation results.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    pub fn new() -> Self { OperationId(Uuid::new_v4()) }

    pub fn as_uuid(&self) -> &Uuid { &self.0 }
}

impl Default for OperationId {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0.hyphenated()) }
}

impl fmt::Debug for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "OperationId({})", self.0.hyphenated()) }
}

impl TryFrom<&str> for OperationId {
    type Error = DecodeError;
    fn try_from(id: &str) -> Result<Self, Self::Error> {
        Uuid::parse_str(id).map(OperationId).map_err(|source| DecodeError::InvalidUuid { value: id.to_owned(), source })
    }
}
