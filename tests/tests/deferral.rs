mod common;

use anyhow::Result;
use common::*;
use opbatch::{EntityId, OperationsSession};
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test]
async fn operation_ids_are_unique() -> Result<()> {
    let session = OperationsSession::new(Arc::new(ScriptedTransport::new()));
    for i in 0..200 {
        session.create_entity("demo", "folder", named(&format!("sh{:03}", i)), None)?;
    }

    let ids: HashSet<_> = session.operations().iter().map(|op| op.id()).collect();
    assert_eq!(ids.len(), 200);
    let entity_ids: HashSet<_> = session.operations().iter().map(|op| op.entity_id()).collect();
    assert_eq!(entity_ids.len(), 200);
    Ok(())
}

#[tokio::test]
async fn deferred_chain_commits_parent_first() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let session = OperationsSession::new(transport.clone());

    let folder = opbatch::CreateOperation::new("demo", "folder", named("sh010"))?;
    let subset = opbatch::CreateOperation::new("demo", "subset", named("modelMain"))?;
    session.create_entity("demo", "version", named("v001"), Some(subset.id()))?;
    session.delete_entity("demo", "folder", EntityId::new(), Some(folder.id()))?;
    assert_eq!(session.deferred_count(), 2);

    // adding the subset first flushes only its own dependent
    session.add(subset.clone());
    session.add(folder.clone());
    assert_eq!(session.deferred_count(), 0);

    let kinds: Vec<_> = session.operations().iter().map(|op| (op.entity_type().to_string(), op.kind().to_string())).collect();
    assert_eq!(
        kinds,
        vec![
            ("subset".to_string(), "create".to_string()),
            ("version".to_string(), "create".to_string()),
            ("folder".to_string(), "create".to_string()),
            ("folder".to_string(), "delete".to_string()),
        ]
    );

    session.commit().await?;
    assert_eq!(transport.posts().len(), 1);
    Ok(())
}

#[tokio::test]
async fn orphaned_dependents_never_commit() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new());
    let session = OperationsSession::new(transport.clone());

    let never_added = opbatch::CreateOperation::new("demo", "folder", named("sh010"))?;
    let orphan = session.create_entity("demo", "subset", named("modelMain"), Some(never_added.id()))?;

    session.commit().await?;
    assert!(transport.posts().is_empty());

    let waiting: Vec<_> = session.deferred_for(&never_added.id()).iter().map(|op| op.id()).collect();
    assert_eq!(waiting, vec![orphan.id()]);
    Ok(())
}
