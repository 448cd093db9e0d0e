//! # opbatch
//!
//! Client-side staging layer for mutating a remote hierarchical entity store (projects containing
//! folders, subsets, versions, representations and workfiles).
//!
//! ## Core Concepts
//!
//! - **Operation**: an intent to create, update or delete one entity in one project
//! - **Session**: the ordered queue of operations waiting to be committed
//! - **Deferral**: holding an operation back until the operation it depends on is queued
//! - **Batch**: the operations of one project, submitted together and applied all-or-nothing
//!
//! ## Example
//!
//! ```rust
//! # use opbatch::{entity, ChangeSet, OperationsSession};
//! # use opbatch_connector_local_process::LocalProcessConnection;
//! # use std::sync::Arc;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(LocalProcessConnection::new());
//! store.add_project("demo");
//! let session = OperationsSession::new(store.clone());
//!
//! let folder = entity::new_folder_entity("sh010", "Shot", None, None, Default::default())?;
//! let folder = session.create_entity("demo", "folder", folder, None)?;
//!
//! let subset = entity::new_subset_entity("modelMain", "model", &folder.entity_id().to_string(), Default::default())?;
//! session.create_entity("demo", "subset", subset, Some(folder.id()))?;
//! session.update_entity("demo", "folder", folder.entity_id(), ChangeSet::new().set("label", "Shot 010"), None)?;
//!
//! session.commit().await?;
//! assert_eq!(store.entity_count("demo"), 2);
//! # Ok(())
//! # }
//! ```

pub use opbatch_core as core;
pub use opbatch_core::{
    changes, deferral, entity, error, project, session, transport, ChangeSet, CommitError, CreateOperation, DeleteOperation, EntityId,
    FieldChange, IntoEntityId, Operation, OperationData, OperationError, OperationId, OperationsSession, ProjectError, Response,
    Transport, TransportError, UpdateOperation,
};
pub use opbatch_proto as proto;

#[cfg(feature = "http")]
pub use opbatch_http_client as http;
