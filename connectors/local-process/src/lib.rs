use async_trait::async_trait;
use opbatch_core::transport::{Response, Transport, TransportError};
use opbatch_proto::{BatchRequest, EntityId, OperationEntry, OperationKind, OperationResult};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

type Reply = oneshot::Sender<Response>;
type PostHook = Box<dyn Fn(&str) + Send + Sync>;

enum Request {
    Post { path: String, body: Value },
    Delete { path: String },
    GetProject { name: String, fields: Option<Vec<String>> },
    GetAnatomyPreset { name: Option<String> },
}

/// An entity as held by the in-memory store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntity {
    pub entity_type: String,
    pub data: Map<String, Value>,
}

#[derive(Debug, Default)]
struct Project {
    meta: Value,
    entities: HashMap<EntityId, StoredEntity>,
}

/// In-memory stand-in for the remote entity store.
///
/// Batches are applied to a scratch copy of the project and only kept when every operation
/// succeeded (or the batch allowed partial failure).
#[derive(Debug, Default)]
struct LocalStore {
    projects: BTreeMap<String, Project>,
    batches: Vec<(String, BatchRequest)>,
}

impl LocalStore {
    fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Post { path, body } => self.post(&path, body),
            Request::Delete { path } => self.delete(&path),
            Request::GetProject { name, fields } => match self.projects.get(&name) {
                Some(project) => Response::ok(select_fields(&project.meta, fields.as_deref())),
                None => Response::new(404, json!({"detail": format!("Project {} not found", name)})),
            },
            Request::GetAnatomyPreset { name } => Response::ok(json!({"name": name.unwrap_or_else(|| "_".to_string())})),
        }
    }

    fn post(&mut self, path: &str, body: Value) -> Response {
        if path == "projects" {
            return self.create_project(body);
        }
        let Some(project_name) = path.strip_prefix("projects/").and_then(|rest| rest.strip_suffix("/operations")) else {
            return Response::new(404, json!({"detail": format!("Unknown endpoint {}", path)}));
        };
        match serde_json::from_value::<BatchRequest>(body) {
            Ok(request) => self.apply_batch(project_name, request),
            Err(e) => Response::new(400, json!({"success": false, "detail": e.to_string()})),
        }
    }

    fn create_project(&mut self, body: Value) -> Response {
        let Some(name) = body.get("name").and_then(Value::as_str).map(str::to_string) else {
            return Response::new(400, json!({"detail": "Missing project name"}));
        };
        if self.projects.contains_key(&name) {
            return Response::new(409, json!({"detail": format!("Project {} already exists", name)}));
        }
        info!("local store: created project {}", name);
        self.projects.insert(name, Project { meta: body, entities: HashMap::new() });
        Response::new(201, json!({}))
    }

    fn delete(&mut self, path: &str) -> Response {
        let name = path.strip_prefix("projects/").unwrap_or(path);
        match self.projects.remove(name) {
            Some(_) => Response::new(204, Value::Null),
            None => Response::new(404, json!({"detail": format!("Project {} not found", name)})),
        }
    }

    fn apply_batch(&mut self, project_name: &str, request: BatchRequest) -> Response {
        let Some(project) = self.projects.get_mut(project_name) else {
            return Response::new(404, json!({"success": false, "detail": format!("Project {} not found", project_name)}));
        };

        let mut scratch = project.entities.clone();
        let mut results = Vec::with_capacity(request.operations.len());
        let mut failed = false;
        for entry in &request.operations {
            if failed && !request.can_fail {
                results.push(OperationResult::failed(entry.id, "not applied"));
                continue;
            }
            match apply_entry(&mut scratch, entry) {
                Ok(()) => results.push(OperationResult::ok(entry.id)),
                Err(error) => {
                    debug!("local store: {} failed: {}", entry, error);
                    failed = true;
                    results.push(OperationResult::failed(entry.id, error));
                }
            }
        }

        if !failed || request.can_fail {
            project.entities = scratch;
        }
        self.batches.push((project_name.to_string(), request));
        Response::ok(json!({"success": !failed, "operations": results}))
    }
}

fn apply_entry(entities: &mut HashMap<EntityId, StoredEntity>, entry: &OperationEntry) -> Result<(), String> {
    match entry.kind {
        OperationKind::Create => {
            if entities.contains_key(&entry.entity_id) {
                return Err(format!("{} {} already exists", entry.entity_type, entry.entity_id));
            }
            let data = entry.data.clone().unwrap_or_default();
            entities.insert(entry.entity_id.clone(), StoredEntity { entity_type: entry.entity_type.clone(), data });
        }
        OperationKind::Update => {
            let entity = entities
                .get_mut(&entry.entity_id)
                .filter(|entity| entity.entity_type == entry.entity_type)
                .ok_or_else(|| format!("{} {} not found", entry.entity_type, entry.entity_id))?;
            for (field, value) in entry.data.iter().flatten() {
                if value.is_null() {
                    entity.data.remove(field);
                } else {
                    entity.data.insert(field.clone(), value.clone());
                }
            }
        }
        OperationKind::Delete => {
            if entities.remove(&entry.entity_id).is_none() {
                return Err(format!("{} {} not found", entry.entity_type, entry.entity_id));
            }
        }
    }
    Ok(())
}

fn select_fields(meta: &Value, fields: Option<&[String]>) -> Value {
    match (meta, fields) {
        (Value::Object(map), Some(fields)) => {
            Value::Object(map.iter().filter(|(key, _)| fields.contains(key)).map(|(k, v)| (k.clone(), v.clone())).collect())
        }
        _ => meta.clone(),
    }
}

/// Transport that talks to an in-memory store running on a local task.
pub struct LocalProcessConnection {
    sender: mpsc::Sender<(Request, Reply)>,
    store: Arc<Mutex<LocalStore>>,
    task: tokio::task::JoinHandle<()>,
    closed: AtomicBool,
    post_hook: Mutex<Option<PostHook>>,
}

impl LocalProcessConnection {
    /// Start the store task. Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(100);
        let store = Arc::new(Mutex::new(LocalStore::default()));
        let task = Self::setup_receiver(store.clone(), rx);
        Self { sender: tx, store, task, closed: AtomicBool::new(false), post_hook: Mutex::new(None) }
    }

    fn setup_receiver(store: Arc<Mutex<LocalStore>>, mut rx: mpsc::Receiver<(Request, Reply)>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            while let Some((request, reply)) = rx.recv().await {
                let response = store.lock().unwrap_or_else(PoisonError::into_inner).handle(request);
                let _ = reply.send(response);
            }
        })
    }

    fn store(&self) -> MutexGuard<'_, LocalStore> { self.store.lock().unwrap_or_else(PoisonError::into_inner) }

    /// Create an empty project directly in the store.
    pub fn add_project(&self, name: &str) {
        self.store().projects.insert(name.to_string(), Project { meta: json!({"name": name, "code": name}), entities: HashMap::new() });
    }

    pub fn entity(&self, project_name: &str, entity_id: EntityId) -> Option<StoredEntity> {
        self.store().projects.get(project_name)?.entities.get(&entity_id).cloned()
    }

    pub fn entity_count(&self, project_name: &str) -> usize { self.store().projects.get(project_name).map_or(0, |p| p.entities.len()) }

    /// Every batch the store has received, in arrival order.
    pub fn batches(&self) -> Vec<(String, BatchRequest)> { self.store().batches.clone() }

    /// Run `hook` with the request path whenever a post is about to be sent.
    pub fn set_post_hook(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.post_hook.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(hook));
    }

    pub fn clear_post_hook(&self) { self.post_hook.lock().unwrap_or_else(PoisonError::into_inner).take(); }

    /// Stop the store task. Every later request fails with `ConnectionClosed`.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.task.abort();
    }

    async fn request(&self, request: Request) -> Result<Response, TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed);
        }
        let (tx, rx) = oneshot::channel();
        self.sender.send((request, tx)).await.map_err(|_| TransportError::ConnectionClosed)?;
        rx.await.map_err(|_| TransportError::ConnectionClosed)
    }
}

impl Default for LocalProcessConnection {
    fn default() -> Self { Self::new() }
}

impl Drop for LocalProcessConnection {
    fn drop(&mut self) { self.task.abort(); }
}

#[async_trait]
impl Transport for LocalProcessConnection {
    async fn post(&self, path: &str, body: Value) -> Result<Response, TransportError> {
        {
            let hook = self.post_hook.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hook) = hook.as_ref() {
                hook(path);
            }
        }
        self.request(Request::Post { path: path.to_string(), body }).await
    }

    async fn delete(&self, path: &str) -> Result<Response, TransportError> { self.request(Request::Delete { path: path.to_string() }).await }

    async fn get_project(&self, project_name: &str, fields: Option<&[&str]>) -> Result<Option<Value>, TransportError> {
        let fields = fields.map(|fields| fields.iter().map(|f| f.to_string()).collect());
        let response = self.request(Request::GetProject { name: project_name.to_string(), fields }).await?;
        Ok(response.is_success().then_some(response.data))
    }

    async fn get_project_anatomy_preset(&self, preset_name: Option<&str>) -> Result<Value, TransportError> {
        let response = self.request(Request::GetAnatomyPreset { name: preset_name.map(str::to_string) }).await?;
        Ok(response.data)
    }
}
