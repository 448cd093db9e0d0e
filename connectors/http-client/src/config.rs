use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const SERVER_URL_VAR: &str = "OPBATCH_SERVER_URL";
pub const API_KEY_VAR: &str = "OPBATCH_API_KEY";
pub const TIMEOUT_VAR: &str = "OPBATCH_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl { url: String, source: url::ParseError },
    #[error("invalid timeout '{0}', expected whole seconds")]
    InvalidTimeout(String),
}

/// Connection settings for [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub server_url: Url,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HttpClientConfig {
    pub fn new(server_url: &str) -> Result<Self, ConfigError> {
        let server_url = Url::parse(server_url).map_err(|source| ConfigError::InvalidUrl { url: server_url.to_string(), source })?;
        Ok(Self { server_url, api_key: None, timeout: DEFAULT_TIMEOUT })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `OPBATCH_SERVER_URL`, `OPBATCH_API_KEY` and `OPBATCH_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|name| std::env::var(name).ok()) }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server_url = lookup(SERVER_URL_VAR).ok_or(ConfigError::MissingVar(SERVER_URL_VAR))?;
        let mut config = Self::new(&server_url)?;
        config.api_key = lookup(API_KEY_VAR).filter(|key| !key.is_empty());
        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            let secs = timeout.trim().parse::<u64>().map_err(|_| ConfigError::InvalidTimeout(timeout.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Absolute url of an api path such as `projects/demo/operations`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        let url = format!("{}/api/{}", self.server_url.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
        Url::parse(&url).map_err(|source| ConfigError::InvalidUrl { url, source })
    }
}
