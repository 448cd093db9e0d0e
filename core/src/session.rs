use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use opbatch_proto::{operations_path, BatchRequest, BatchResponse, OperationId};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    changes::ChangeSet,
    deferral::DeferralMap,
    error::{CommitError, OperationError, TransportError},
    id::IntoEntityId,
    operation::{CreateOperation, DeleteOperation, Operation, OperationData, UpdateOperation},
    transport::Transport,
};

#[derive(Debug, Default)]
struct SessionState {
    ready: Vec<Operation>,
    deferred: DeferralMap,
}

impl SessionState {
    /// Push `operation` and, depth first, everything that was deferred behind it.
    fn enqueue(&mut self, operation: Operation) {
        let mut stack = vec![operation];
        while let Some(operation) = stack.pop() {
            let id = operation.id();
            self.ready.push(operation);
            if let Some(dependents) = self.deferred.take(&id) {
                debug!("flushing {} operations deferred on {}", dependents.len(), id);
                stack.extend(dependents.into_iter().rev());
            }
        }
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    state: Mutex<SessionState>,
    projects: Mutex<HashMap<String, Option<Value>>>,
}

/// Ordered queue of pending operations and the commit protocol that submits them.
///
/// Cloning yields another handle to the same session, so a callback running inside the transport
/// can queue follow-up work. The session is meant to have a single committer; no lock is held
/// while a batch is in flight.
#[derive(Clone)]
pub struct OperationsSession(Arc<Inner>);

impl OperationsSession {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self(Arc::new(Inner { transport, state: Mutex::new(SessionState::default()), projects: Mutex::new(HashMap::new()) }))
    }

    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self { Self::new(Arc::new(transport)) }

    pub fn transport(&self) -> &Arc<dyn Transport> { &self.0.transport }

    fn state(&self) -> MutexGuard<'_, SessionState> { self.0.state.lock().unwrap_or_else(PoisonError::into_inner) }

    /// Number of operations in the ready queue.
    pub fn len(&self) -> usize { self.state().ready.len() }

    pub fn is_empty(&self) -> bool { self.state().ready.is_empty() }

    /// Append an operation to the ready queue, followed by everything deferred on it.
    pub fn add(&self, operation: impl Into<Operation>) { self.state().enqueue(operation.into()); }

    pub fn append(&self, operation: impl Into<Operation>) { self.add(operation) }

    pub fn extend<I>(&self, operations: I)
    where
        I: IntoIterator,
        I::Item: Into<Operation>,
    {
        let mut state = self.state();
        for operation in operations {
            state.enqueue(operation.into());
        }
    }

    /// Remove a queued operation. Operations deferred on it stay deferred.
    pub fn remove(&self, id: &OperationId) -> Option<Operation> {
        let mut state = self.state();
        let index = state.ready.iter().position(|operation| operation.id() == *id)?;
        Some(state.ready.remove(index))
    }

    /// Empty the ready queue. Deferred operations are kept.
    pub fn clear(&self) { self.state().ready.clear(); }

    /// Snapshot of the ready queue.
    pub fn operations(&self) -> Vec<Operation> { self.state().ready.clone() }

    pub fn to_data(&self) -> Vec<OperationData> { self.state().ready.iter().map(Operation::to_data).collect() }

    /// Number of operations still waiting for a parent.
    pub fn deferred_count(&self) -> usize { self.state().deferred.operation_count() }

    /// Operations waiting for `parent` to be queued.
    pub fn deferred_for(&self, parent: &OperationId) -> Vec<Operation> { self.state().deferred.dependents(parent).to_vec() }

    fn schedule(&self, operation: Operation, depends_on: Option<OperationId>) {
        let mut state = self.state();
        match depends_on {
            Some(parent) if state.ready.iter().any(|queued| queued.id() == parent) => state.enqueue(operation),
            Some(parent) => {
                debug!("deferring {} until {} is queued", operation, parent);
                state.deferred.defer(parent, operation);
            }
            None => state.enqueue(operation),
        }
    }

    /// Build a create operation and queue it.
    ///
    /// With `depends_on`, the operation is queued right away if that operation is already in the
    /// ready queue, and deferred until it is added otherwise. Queued right away means appended to the
    /// tail: anything queued since the parent sits between the two, which keeps the parent first.
    pub fn create_entity(
        &self,
        project_name: &str,
        entity_type: &str,
        data: Map<String, Value>,
        depends_on: Option<OperationId>,
    ) -> Result<CreateOperation, OperationError> {
        let operation = CreateOperation::new(project_name, entity_type, data)?;
        self.schedule(operation.clone().into(), depends_on);
        Ok(operation)
    }

    /// Build an update operation and queue it, deferring it like [`create_entity`](Self::create_entity).
    pub fn update_entity(
        &self,
        project_name: &str,
        entity_type: &str,
        entity_id: impl IntoEntityId,
        changes: ChangeSet,
        depends_on: Option<OperationId>,
    ) -> Result<UpdateOperation, OperationError> {
        let operation = UpdateOperation::new(project_name, entity_type, entity_id, changes)?;
        self.schedule(operation.clone().into(), depends_on);
        Ok(operation)
    }

    /// Build a delete operation and queue it, deferring it like [`create_entity`](Self::create_entity).
    pub fn delete_entity(
        &self,
        project_name: &str,
        entity_type: &str,
        entity_id: impl IntoEntityId,
        depends_on: Option<OperationId>,
    ) -> Result<DeleteOperation, OperationError> {
        let operation = DeleteOperation::new(project_name, entity_type, entity_id)?;
        self.schedule(operation.clone().into(), depends_on);
        Ok(operation)
    }

    /// Project metadata, fetched once per name for the life of the session. Missing projects are
    /// memoized too. The cache is never invalidated.
    pub async fn get_project(&self, project_name: &str) -> Result<Option<Value>, TransportError> {
        let cached = self.0.projects.lock().unwrap_or_else(PoisonError::into_inner).get(project_name).cloned();
        if let Some(project) = cached {
            return Ok(project);
        }

        let project = self.0.transport.get_project(project_name, None).await?;
        self.0.projects.lock().unwrap_or_else(PoisonError::into_inner).insert(project_name.to_string(), project.clone());
        Ok(project)
    }

    /// Submit every queued operation, one all-or-nothing batch per project.
    ///
    /// The ready queue is detached before any I/O, so operations queued while a batch is in flight
    /// go to the next commit. The first failing project aborts the commit; later projects are not
    /// submitted and detached operations are not restored.
    pub async fn commit(&self) -> Result<(), CommitError> {
        let operations = std::mem::take(&mut self.state().ready);
        if operations.is_empty() {
            debug!("commit: nothing to submit");
            return Ok(());
        }

        for (project_name, operations) in partition_by_project(operations) {
            let entries: Vec<_> = operations.iter().filter_map(Operation::to_server_operation).collect();
            if entries.is_empty() {
                debug!("commit: {} operations for {} are all no-ops, skipping", operations.len(), project_name);
                continue;
            }

            let request = BatchRequest::all_or_nothing(entries);
            let body = serde_json::to_value(&request)?;
            info!("commit: submitting {} operations to {}", request.operations.len(), project_name);

            let response = self.0.transport.post(&operations_path(&project_name), body).await?;
            interpret_response(&project_name, &request, response.data)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for OperationsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("OperationsSession").field("ready", &state.ready.len()).field("deferred", &state.deferred.operation_count()).finish()
    }
}

/// Group operations by project, keeping first-seen project order and relative order within each.
fn partition_by_project(operations: Vec<Operation>) -> Vec<(String, Vec<Operation>)> {
    let mut partitions: Vec<(String, Vec<Operation>)> = Vec::new();
    for operation in operations {
        match partitions.iter_mut().find(|(name, _)| name == operation.project_name()) {
            Some((_, group)) => group.push(operation),
            None => partitions.push((operation.project_name().to_string(), vec![operation])),
        }
    }
    partitions
}

fn interpret_response(project_name: &str, request: &BatchRequest, data: Value) -> Result<(), CommitError> {
    // an accepted batch needs no further inspection, whatever the breakdown looks like
    if data.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }

    let response: BatchResponse = match serde_json::from_value(data.clone()) {
        Ok(response) => response,
        Err(e) => {
            warn!("commit: unreadable response from {}: {}", project_name, e);
            return Err(CommitError::BatchFailed { project: project_name.to_string(), response: data });
        }
    };

    match response.first_failure() {
        Some(failure) => {
            warn!("commit: operation {} failed in {}", failure.id, project_name);
            Err(CommitError::OperationFailed {
                project: project_name.to_string(),
                operation_id: failure.id,
                payload: request.entry(&failure.id).cloned().map(Box::new),
                error: failure.error.clone().unwrap_or_default(),
            })
        }
        None => {
            warn!("commit: batch for {} failed without an operation breakdown", project_name);
            Err(CommitError::BatchFailed { project: project_name.to_string(), response: data })
        }
    }
}
