mod common;

use anyhow::Result;
use opbatch::{project, ProjectError};
use opbatch_connector_local_process::LocalProcessConnection;

#[tokio::test]
async fn create_then_delete_project() -> Result<()> {
    let store = LocalProcessConnection::new();

    let created = project::create_project(&store, "demo_2024", "demo", false, Some("studio")).await?;
    assert_eq!(created["name"], "demo_2024");
    assert_eq!(created["code"], "demo");
    assert_eq!(created["anatomy"]["name"], "studio");

    match project::create_project(&store, "demo_2024", "demo", false, None).await {
        Err(ProjectError::AlreadyExists(name)) => assert_eq!(name, "demo_2024"),
        other => panic!("expected AlreadyExists, got {:?}", other),
    }

    project::delete_project(&store, "demo_2024").await?;
    match project::delete_project(&store, "demo_2024").await {
        Err(ProjectError::NotFound(name)) => assert_eq!(name, "demo_2024"),
        other => panic!("expected NotFound, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn invalid_project_name_is_rejected_before_any_request() -> Result<()> {
    let store = LocalProcessConnection::new();
    store.shutdown();

    // a closed connection would fail any request, so this proves none was made
    match project::create_project(&store, "demo-2024", "demo", false, None).await {
        Err(ProjectError::InvalidName(name)) => assert_eq!(name, "demo-2024"),
        other => panic!("expected InvalidName, got {:?}", other),
    }
    Ok(())
}
