use crate::config::UpstreamConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Data collaborator holding the raw client records. The record comes
/// back untyped; only the normalizer is allowed to interpret it.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Value, DirectoryError>;
}

/// Upstream fetch failures, surfaced to the caller distinctly from any
/// analysis outcome.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("client '{0}' not found")]
    NotFound(String),
    #[error("CRM upstream unreachable: {0}")]
    Unreachable(String),
}

/// HTTP client for the CRM's record endpoint, time-bounded at the
/// client level so a hung upstream reads as unreachable.
pub struct HttpClientDirectory {
    base_url: String,
    client: Client,
}

impl HttpClientDirectory {
    pub fn new(config: &UpstreamConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| DirectoryError::Unreachable(err.to_string()))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }
}

/// Stand-in for the offline CLI path, which analyzes a record read from
/// a local file. Any fetch through it is a wiring mistake and fails.
pub struct OfflineDirectory;

#[async_trait]
impl ClientDirectory for OfflineDirectory {
    async fn fetch(&self, _id: &str) -> Result<Value, DirectoryError> {
        Err(DirectoryError::Unreachable(
            "offline mode has no CRM upstream".to_string(),
        ))
    }
}

#[async_trait]
impl ClientDirectory for HttpClientDirectory {
    async fn fetch(&self, id: &str) -> Result<Value, DirectoryError> {
        let url = format!("{}/api/clients/{id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| DirectoryError::Unreachable(err.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(id.to_string()));
        }

        if !response.status().is_success() {
            return Err(DirectoryError::Unreachable(format!(
                "upstream returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| DirectoryError::Unreachable(format!("invalid upstream body: {err}")))
    }
}
