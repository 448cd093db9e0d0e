use async_trait::async_trait;
use opbatch_core::transport::{Response, Transport, TransportError};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::config::HttpClientConfig;

const API_KEY_HEADER: &str = "x-api-key";

/// Transport speaking JSON over HTTP to the entity store's REST api.
pub struct HttpClient {
    config: HttpClientConfig,
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build().map_err(|e| TransportError::Other(e.into()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpClientConfig { &self.config }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, TransportError> {
        let url = self.config.endpoint(path).map_err(|e| TransportError::Other(e.into()))?;
        let mut builder = self.client.request(method, url);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, TransportError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let data = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))? };
        debug!("http: {} ({} bytes)", status, bytes.len());
        Ok(Response::new(status, data))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::ConnectionClosed
    } else {
        TransportError::Other(err.into())
    }
}

fn status_error(response: Response) -> TransportError { TransportError::Status { status: response.status, body: response.data.to_string() } }

#[async_trait]
impl Transport for HttpClient {
    async fn post(&self, path: &str, body: Value) -> Result<Response, TransportError> {
        let builder = self.request(Method::POST, path)?.json(&body);
        self.send(builder).await
    }

    async fn delete(&self, path: &str) -> Result<Response, TransportError> { self.send(self.request(Method::DELETE, path)?).await }

    async fn get_project(&self, project_name: &str, fields: Option<&[&str]>) -> Result<Option<Value>, TransportError> {
        let mut builder = self.request(Method::GET, &format!("projects/{}", project_name))?;
        if let Some(fields) = fields {
            builder = builder.query(&[("fields", fields.join(","))]);
        }
        let response = self.send(builder).await?;
        match response.status {
            404 => Ok(None),
            _ if response.is_success() => Ok(Some(response.data)),
            _ => Err(status_error(response)),
        }
    }

    async fn get_project_anatomy_preset(&self, preset_name: Option<&str>) -> Result<Value, TransportError> {
        let path = format!("anatomy/presets/{}", preset_name.unwrap_or("_"));
        let response = self.send(self.request(Method::GET, &path)?).await?;
        if !response.is_success() {
            return Err(status_error(response));
        }
        Ok(response.data)
    }
}
