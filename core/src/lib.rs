//! Client-side staging of entity mutations.
//!
//! Callers describe creates, updates and deletes as [`Operation`]s, queue them on an
//! [`OperationsSession`] (optionally deferred behind a parent operation), and [`commit`] them. A
//! commit submits one all-or-nothing batch per project through a [`Transport`] and reports the
//! first failure it observes.
//!
//! [`commit`]: OperationsSession::commit

pub mod changes;
pub mod deferral;
pub mod entity;
pub mod error;
pub mod id;
pub mod operation;
pub mod project;
pub mod session;
pub mod transport;

pub use changes::{ChangeSet, FieldChange};
pub use error::{CommitError, OperationError, ProjectError};
pub use id::IntoEntityId;
pub use operation::{CreateOperation, DeleteOperation, Operation, OperationData, UpdateOperation};
pub use session::OperationsSession;
pub use transport::{Response, Transport, TransportError};

pub use opbatch_proto as proto;
pub use opbatch_proto::{EntityId, OperationId};
