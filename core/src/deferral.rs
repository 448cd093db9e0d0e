use std::collections::HashMap;

use opbatch_proto::OperationId;

use crate::operation::Operation;

/// Operations waiting for a parent operation to reach the ready queue.
///
/// Keyed by the parent's operation id. An entry is taken exactly once, when its parent is queued. An
/// entry whose parent is never queued stays here for the life of the session.
#[derive(Debug, Default)]
pub struct DeferralMap {
    pending: HashMap<OperationId, Vec<Operation>>,
}

impl DeferralMap {
    pub fn new() -> Self { Self::default() }

    /// Queue `operation` behind `parent`, after anything already deferred on it.
    pub fn defer(&mut self, parent: OperationId, operation: Operation) { self.pending.entry(parent).or_default().push(operation); }

    /// Remove and return the dependents of `parent`, in deferral order.
    pub fn take(&mut self, parent: &OperationId) -> Option<Vec<Operation>> { self.pending.remove(parent) }

    pub fn dependents(&self, parent: &OperationId) -> &[Operation] { self.pending.get(parent).map(Vec::as_slice).unwrap_or(&[]) }

    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    /// Number of deferred operations across all parents.
    pub fn operation_count(&self) -> usize { self.pending.values().map(Vec::len).sum() }
}
