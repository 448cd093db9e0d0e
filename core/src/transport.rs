use async_trait::async_trait;
use serde_json::Value;

/// Connection to the remote entity store.
///
/// The session never reaches for an ambient connection; a transport is always handed to it. Timeouts
/// and cancellation are the transport's business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `POST {path}` with a JSON body.
    async fn post(&self, path: &str, body: Value) -> Result<Response, TransportError>;

    /// `DELETE {path}`.
    async fn delete(&self, path: &str) -> Result<Response, TransportError>;

    /// Project metadata, or `None` when the project doesn't exist. `fields` limits the returned keys.
    async fn get_project(&self, project_name: &str, fields: Option<&[&str]>) -> Result<Option<Value>, TransportError>;

    /// Anatomy preset used to seed new projects. `None` selects the server default.
    async fn get_project_anatomy_preset(&self, preset_name: Option<&str>) -> Result<Value, TransportError>;
}

/// Decoded response of a request that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub data: Value,
}

impl Response {
    pub fn new(status: u16, data: Value) -> Self { Self { status, data } }

    pub fn ok(data: Value) -> Self { Self { status: 200, data } }

    pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

    /// Server supplied `detail` message, if any.
    pub fn detail(&self) -> Option<&str> { self.data.get("detail").and_then(Value::as_str) }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Request timeout")]
    Timeout,
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}
