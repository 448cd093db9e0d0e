//! HTTP transport for opbatch sessions.
//!
//! ```no_run
//! # use opbatch_core::OperationsSession;
//! # use opbatch_http_client::{HttpClient, HttpClientConfig};
//! # async fn run() -> anyhow::Result<()> {
//! let client = HttpClient::new(HttpClientConfig::from_env()?)?;
//! let session = OperationsSession::with_transport(client);
//! session.commit().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;

pub use client::HttpClient;
pub use config::{ConfigError, HttpClientConfig};
