//! Project creation and removal. These are single request/response calls with no batching.

use serde_json::{json, Value};
use tracing::info;

use crate::{error::ProjectError, transport::Transport};

/// Project names are restricted to ASCII letters, digits and underscores.
pub fn is_valid_project_name(name: &str) -> bool { !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') }

/// Create a project from an anatomy preset and return the created project.
///
/// The project entity is created blindly with the minimum information; nothing beyond the name is
/// validated client-side.
pub async fn create_project(
    transport: &dyn Transport,
    project_name: &str,
    project_code: &str,
    library_project: bool,
    preset_name: Option<&str>,
) -> Result<Value, ProjectError> {
    if !is_valid_project_name(project_name) {
        return Err(ProjectError::InvalidName(project_name.to_string()));
    }
    if transport.get_project(project_name, Some(&["name"][..])).await?.is_some() {
        return Err(ProjectError::AlreadyExists(project_name.to_string()));
    }

    let anatomy = transport.get_project_anatomy_preset(preset_name).await?;
    let body = json!({
        "name": project_name,
        "code": project_code,
        "anatomy": anatomy,
        "library": library_project,
    });

    let response = transport.post("projects", body).await?;
    if response.status != 201 {
        let detail = response.detail().map(str::to_string).unwrap_or_else(|| format!("Unknown details ({})", response.status));
        return Err(ProjectError::CreateFailed { name: project_name.to_string(), detail });
    }
    info!("created project {}", project_name);

    transport.get_project(project_name, None).await?.ok_or_else(|| ProjectError::NotFound(project_name.to_string()))
}

pub async fn delete_project(transport: &dyn Transport, project_name: &str) -> Result<(), ProjectError> {
    if transport.get_project(project_name, Some(&["name"][..])).await?.is_none() {
        return Err(ProjectError::NotFound(project_name.to_string()));
    }

    let response = transport.delete(&format!("projects/{}", project_name)).await?;
    if response.status != 204 {
        let detail = response.detail().map(str::to_string).unwrap_or_else(|| format!("Unknown details ({})", response.status));
        return Err(ProjectError::DeleteFailed { name: project_name.to_string(), detail });
    }
    info!("deleted project {}", project_name);
    Ok(())
}
