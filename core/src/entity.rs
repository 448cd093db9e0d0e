//! Skeleton payloads for the common entity types.
//!
//! These only fill in defaults and validate ids; they hold no state. Feed the result to
//! `CreateOperation::new` or `OperationsSession::create_entity`.

use opbatch_proto::EntityId;
use serde_json::{json, Map, Value};

use crate::{error::OperationError, id::IntoEntityId};

/// Optional fields shared by most skeletons.
#[derive(Debug, Clone, Default)]
pub struct EntityExtras {
    pub attrib: Map<String, Value>,
    pub data: Map<String, Value>,
    /// Predefined entity id. A new one is generated when absent.
    pub entity_id: Option<String>,
}

impl EntityExtras {
    pub fn with_id(entity_id: impl Into<String>) -> Self { Self { entity_id: Some(entity_id.into()), ..Default::default() } }

    fn resolve_id(&self) -> Result<EntityId, OperationError> { entity_id_or_new(self.entity_id.as_deref()) }
}

fn entity_id_or_new(entity_id: Option<&str>) -> Result<EntityId, OperationError> {
    match entity_id {
        Some(id) => id.into_entity_id(),
        None => Ok(EntityId::new()),
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub fn new_folder_entity(
    name: &str,
    folder_type: &str,
    parent_id: Option<&str>,
    thumbnail_id: Option<&str>,
    extras: EntityExtras,
) -> Result<Map<String, Value>, OperationError> {
    let id = extras.resolve_id()?;
    let parent_id = parent_id.map(IntoEntityId::into_entity_id).transpose()?;
    Ok(into_map(json!({
        "id": id,
        "name": name,
        "folderType": folder_type,
        "parentId": parent_id,
        "data": extras.data,
        "attrib": extras.attrib,
        "thumbnailId": thumbnail_id,
    })))
}

pub fn new_subset_entity(name: &str, family: &str, folder_id: &str, extras: EntityExtras) -> Result<Map<String, Value>, OperationError> {
    let id = extras.resolve_id()?;
    let folder_id = folder_id.into_entity_id()?;
    Ok(into_map(json!({
        "id": id,
        "name": name,
        "family": family,
        "attrib": extras.attrib,
        "data": extras.data,
        "folderId": folder_id,
    })))
}

pub fn new_version_entity(version: i64, subset_id: &str, extras: EntityExtras) -> Result<Map<String, Value>, OperationError> {
    let id = extras.resolve_id()?;
    let subset_id = subset_id.into_entity_id()?;
    Ok(into_map(json!({
        "id": id,
        "version": version,
        "subsetId": subset_id,
        "attrib": extras.attrib,
        "data": extras.data,
    })))
}

/// Hero versions carry the negated version number of the version they mirror.
pub fn new_hero_version_entity(version: i64, subset_id: &str, extras: EntityExtras) -> Result<Map<String, Value>, OperationError> {
    let mut entity = new_version_entity(version, subset_id, extras)?;
    entity.insert("version".to_string(), json!(-version.abs()));
    Ok(entity)
}

pub fn new_representation_entity(name: &str, version_id: &str, extras: EntityExtras) -> Result<Map<String, Value>, OperationError> {
    let id = extras.resolve_id()?;
    let version_id = version_id.into_entity_id()?;
    Ok(into_map(json!({
        "id": id,
        "versionId": version_id,
        "name": name,
        "data": extras.data,
        "attrib": extras.attrib,
    })))
}

/// Workfile records are mostly used for artist notes; they have no attributes.
pub fn new_workfile_info(
    filename: &str,
    folder_id: &str,
    task_name: &str,
    files: &[String],
    data: Map<String, Value>,
    entity_id: Option<&str>,
) -> Result<Map<String, Value>, OperationError> {
    let id = entity_id_or_new(entity_id)?;
    let folder_id = folder_id.into_entity_id()?;
    Ok(into_map(json!({
        "id": id,
        "parent": folder_id,
        "task_name": task_name,
        "filename": filename,
        "data": data,
        "files": files,
    })))
}
