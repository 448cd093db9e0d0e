//! Shared fixtures for the opbatch integration tests.

use async_trait::async_trait;
use opbatch::{Response, Transport, TransportError};
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Transport that records raw request bodies and replays queued responses.
///
/// Posts answer `{"success": true}` once the queue runs dry.
#[derive(Default)]
pub struct ScriptedTransport {
    posts: Mutex<Vec<(String, Value)>>,
    responses: Mutex<VecDeque<Value>>,
}

impl ScriptedTransport {
    pub fn new() -> Self { Self::default() }

    pub fn respond_with(self, response: Value) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Every `(path, body)` posted so far.
    pub fn posts(&self) -> Vec<(String, Value)> { self.posts.lock().unwrap().clone() }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, path: &str, body: Value) -> Result<Response, TransportError> {
        self.posts.lock().unwrap().push((path.to_string(), body));
        let data = self.responses.lock().unwrap().pop_front().unwrap_or_else(|| json!({"success": true}));
        Ok(Response::ok(data))
    }

    async fn delete(&self, _path: &str) -> Result<Response, TransportError> { Ok(Response::new(204, Value::Null)) }

    async fn get_project(&self, project_name: &str, _fields: Option<&[&str]>) -> Result<Option<Value>, TransportError> {
        Ok(Some(json!({"name": project_name})))
    }

    async fn get_project_anatomy_preset(&self, _preset_name: Option<&str>) -> Result<Value, TransportError> { Ok(json!({})) }
}

/// `{"name": name}` as a payload map.
pub fn named(name: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("name".into(), json!(name));
    map
}
