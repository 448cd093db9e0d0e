use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// New state of a single top-level field in an update.
///
/// `Remove` deletes the field on the server. It is distinct from `Set(Value::Null)`, although both
/// render as `null` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Set(Value),
    Remove,
}

impl FieldChange {
    pub fn is_remove(&self) -> bool { matches!(self, FieldChange::Remove) }

    pub fn render(&self) -> Value {
        match self {
            FieldChange::Set(value) => value.clone(),
            FieldChange::Remove => Value::Null,
        }
    }
}

impl From<Value> for FieldChange {
    fn from(value: Value) -> Self { FieldChange::Set(value) }
}

/// Shallow change-set of an update operation, keyed by top-level field name.
///
/// Nested values are replaced wholesale; nothing is merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet(BTreeMap<String, FieldChange>);

impl ChangeSet {
    pub fn new() -> Self { Self::default() }

    /// Builder form of [`ChangeSet::insert`] with a new value.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, FieldChange::Set(value.into()));
        self
    }

    /// Builder form of [`ChangeSet::insert`] with a removal.
    pub fn remove(mut self, field: impl Into<String>) -> Self {
        self.insert(field, FieldChange::Remove);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, change: FieldChange) -> Option<FieldChange> { self.0.insert(field.into(), change) }

    pub fn get(&self, field: &str) -> Option<&FieldChange> { self.0.get(field) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldChange)> { self.0.iter() }

    /// JSON rendering with removals spelled as `null`.
    pub fn render(&self) -> Map<String, Value> { self.0.iter().map(|(field, change)| (field.clone(), change.render())).collect() }
}

impl From<Map<String, Value>> for ChangeSet {
    fn from(map: Map<String, Value>) -> Self { map.into_iter().map(|(field, value)| (field, FieldChange::Set(value))).collect() }
}

impl<K: Into<String>> FromIterator<(K, FieldChange)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (K, FieldChange)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(field, change)| (field.into(), change)).collect())
    }
}
