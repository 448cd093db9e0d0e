mod common;

use anyhow::Result;
use common::*;
use opbatch::{ChangeSet, CommitError, EntityId, OperationsSession, TransportError};
use opbatch_connector_local_process::LocalProcessConnection;
use std::sync::Arc;

#[tokio::test]
async fn second_of_three_failing_is_reported_alone() -> Result<()> {
    let store = Arc::new(LocalProcessConnection::new());
    store.add_project("demo");
    let session = OperationsSession::new(store.clone());

    let first = session.create_entity("demo", "folder", named("sh010"), None)?;
    let second = session.update_entity("demo", "folder", EntityId::new(), ChangeSet::new().set("label", "ghost"), None)?;
    session.create_entity("demo", "folder", named("sh030"), None)?;

    let err = session.commit().await.unwrap_err();
    match &err {
        CommitError::OperationFailed { project, operation_id, payload, error } => {
            assert_eq!(project, "demo");
            assert_eq!(*operation_id, second.id());
            assert_eq!(payload.as_deref(), second.to_server_operation().as_ref());
            assert!(error.contains("not found"), "unexpected error text: {}", error);
        }
        other => panic!("expected operation failure, got {:?}", other),
    }
    assert!(err.to_string().contains(&second.id().to_string()));

    // the batch was all-or-nothing
    assert_eq!(store.entity_count("demo"), 0);
    assert!(store.entity("demo", first.entity_id()).is_none());
    // detached operations are not restored
    assert!(session.is_empty());
    Ok(())
}

#[tokio::test]
async fn earlier_projects_stay_applied_when_a_later_one_fails() -> Result<()> {
    let store = Arc::new(LocalProcessConnection::new());
    store.add_project("alpha");
    store.add_project("beta");
    store.add_project("gamma");
    let session = OperationsSession::new(store.clone());

    session.create_entity("alpha", "folder", named("sh010"), None)?;
    session.delete_entity("beta", "folder", EntityId::new(), None)?;
    session.create_entity("gamma", "folder", named("sh010"), None)?;

    let err = session.commit().await.unwrap_err();
    assert_eq!(err.project(), Some("beta"));
    assert_eq!(store.entity_count("alpha"), 1);
    assert_eq!(store.entity_count("gamma"), 0);
    assert_eq!(store.batches().iter().map(|(project, _)| project.as_str()).collect::<Vec<_>>(), vec!["alpha", "beta"]);
    Ok(())
}

#[tokio::test]
async fn missing_project_fails_without_breakdown() -> Result<()> {
    let store = Arc::new(LocalProcessConnection::new());
    let session = OperationsSession::new(store);
    session.create_entity("nowhere", "folder", named("sh010"), None)?;

    match session.commit().await {
        Err(CommitError::BatchFailed { project, response }) => {
            assert_eq!(project, "nowhere");
            assert_eq!(response["success"], false);
        }
        other => panic!("expected batch failure, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn transport_faults_propagate() -> Result<()> {
    let store = Arc::new(LocalProcessConnection::new());
    store.add_project("demo");
    let session = OperationsSession::new(store.clone());
    session.create_entity("demo", "folder", named("sh010"), None)?;

    store.shutdown();
    let err = session.commit().await.unwrap_err();
    assert!(matches!(err, CommitError::Transport(TransportError::ConnectionClosed)));
    assert!(session.is_empty());
    Ok(())
}
