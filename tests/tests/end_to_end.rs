mod common;

use anyhow::Result;
use common::*;
use opbatch::{entity, CommitError, OperationsSession};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn folder_then_deferred_subset_are_submitted_in_order() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let session = OperationsSession::new(transport.clone());

    let folder = opbatch::CreateOperation::new("demo", "folder", named("sh010"))?;
    let folder_id = folder.entity_id().to_string();
    let subset_payload = entity::new_subset_entity("modelMain", "model", &folder_id, Default::default())?;
    let subset = session.create_entity("demo", "subset", subset_payload, Some(folder.id()))?;
    assert!(session.is_empty());

    session.add(folder.clone());
    session.commit().await?;

    let posts = transport.posts();
    assert_eq!(posts.len(), 1);
    let (path, body) = &posts[0];
    assert_eq!(path, "projects/demo/operations");
    assert_eq!(body["canFail"], false);

    let operations = body["operations"].as_array().unwrap();
    assert_eq!(operations.len(), 2);
    assert_eq!(
        operations[0],
        json!({
            "id": folder.id().to_string(),
            "type": "create",
            "entityType": "folder",
            "entityId": folder_id,
            "data": {"id": folder_id, "name": "sh010"},
        })
    );
    assert_eq!(operations[1]["type"], "create");
    assert_eq!(operations[1]["entityType"], "subset");
    assert_eq!(operations[1]["id"], json!(subset.id().to_string()));
    assert_eq!(operations[1]["data"]["folderId"], json!(folder_id));
    assert!(session.is_empty());

    Ok(())
}

#[tokio::test]
async fn removal_markers_reach_the_wire_as_null() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let session = OperationsSession::new(transport.clone());

    let changes = opbatch::ChangeSet::new().remove("thumbnailId").set("label", "Shot 010");
    let update = session.update_entity("demo", "folder", opbatch::EntityId::new(), changes, None)?;
    session.commit().await?;

    let (_, body) = &transport.posts()[0];
    assert_eq!(body["operations"][0]["data"], json!({"thumbnailId": null, "label": "Shot 010"}));
    assert_eq!(body["operations"][0]["entityId"], json!(update.entity_id().to_string()));
    Ok(())
}

#[tokio::test]
async fn empty_updates_keep_their_slot_but_are_never_sent() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let session = OperationsSession::new(transport.clone());

    let first = session.create_entity("demo", "folder", named("sh010"), None)?;
    let noop = session.update_entity("demo", "folder", first.entity_id(), Default::default(), None)?;
    let last = session.delete_entity("demo", "folder", opbatch::EntityId::new(), None)?;

    let queued: Vec<_> = session.operations().iter().map(|op| op.id()).collect();
    assert_eq!(queued, vec![first.id(), noop.id(), last.id()]);

    session.commit().await?;
    let (_, body) = &transport.posts()[0];
    let sent: Vec<_> = body["operations"].as_array().unwrap().iter().map(|op| op["id"].clone()).collect();
    assert_eq!(sent, vec![json!(first.id().to_string()), json!(last.id().to_string())]);
    Ok(())
}

#[tokio::test]
async fn unreadable_response_is_a_batch_failure() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new().respond_with(json!("internal server error")));
    let session = OperationsSession::new(transport);
    session.create_entity("demo", "folder", named("sh010"), None)?;

    match session.commit().await {
        Err(CommitError::BatchFailed { project, response }) => {
            assert_eq!(project, "demo");
            assert_eq!(response, json!("internal server error"));
        }
        other => panic!("expected batch failure, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn accepted_batch_is_not_second_guessed() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new().respond_with(json!({"success": true, "operations": [{"id": "op-1", "success": true}]})));
    let session = OperationsSession::new(transport.clone());
    session.create_entity("demo", "folder", named("sh010"), None)?;

    session.commit().await?;
    assert_eq!(transport.posts().len(), 1);
    Ok(())
}
