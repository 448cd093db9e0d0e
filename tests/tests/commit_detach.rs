//! Operations queued while a commit is in flight belong to the next commit.

mod common;

use anyhow::Result;
use common::*;
use opbatch::OperationsSession;
use opbatch_connector_local_process::LocalProcessConnection;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn operation_added_during_commit_lands_in_next_commit() -> Result<()> {
    let store = Arc::new(LocalProcessConnection::new());
    store.add_project("demo");
    let session = OperationsSession::new(store.clone());

    let first = session.create_entity("demo", "folder", named("sh010"), None)?;

    let late_id = Arc::new(Mutex::new(None));
    {
        let session = session.clone();
        let late_id = late_id.clone();
        store.set_post_hook(move |_path| {
            let op = session.create_entity("demo", "folder", named("sh020"), None).unwrap();
            *late_id.lock().unwrap() = Some(op.id());
        });
    }

    session.commit().await?;
    store.clear_post_hook();

    let late_id = late_id.lock().unwrap().expect("hook ran");
    let batches = store.batches();
    assert_eq!(batches.len(), 1);
    let sent: Vec<_> = batches[0].1.operations.iter().map(|entry| entry.id).collect();
    assert_eq!(sent, vec![first.id()]);

    let queued: Vec<_> = session.operations().iter().map(|op| op.id()).collect();
    assert_eq!(queued, vec![late_id]);

    session.commit().await?;
    assert_eq!(store.batches().len(), 2);
    assert_eq!(store.entity_count("demo"), 2);
    assert!(session.is_empty());
    Ok(())
}

#[tokio::test]
async fn commit_with_only_noops_makes_no_calls() -> Result<()> {
    let store = Arc::new(LocalProcessConnection::new());
    store.add_project("demo");
    let session = OperationsSession::new(store.clone());

    session.update_entity("demo", "folder", opbatch::EntityId::new(), Default::default(), None)?;
    session.commit().await?;
    session.commit().await?;

    assert!(store.batches().is_empty());
    assert!(session.is_empty());
    Ok(())
}
