//! Wire schema for the remote entity store's batch operations endpoint.
//!
//! Everything here is plain data: identifiers, the per-operation entries sent in a batch, and the
//! batch response with its optional per-operation breakdown.

pub mod batch;
pub mod error;
pub mod id;
pub mod operation;

pub use batch::*;
pub use error::*;
pub use id::*;
pub use operation::*;
