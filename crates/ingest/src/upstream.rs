use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use tracing::debug;

/// Where and how to reach the proxy's usage API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub base_url: String,
    pub api_key: String,
}

impl UpstreamTarget {
    pub fn usage_url(&self) -> String {
        format!("{}/usage", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream responded {status} {status_text}")]
    Status { status: u16, status_text: String },
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The upstream answered 2xx but its body could not be read.
    #[error("reading upstream body failed: {0}")]
    Body(String),
}

/// Source of raw `/usage` response bodies.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn fetch_usage(&self, target: &UpstreamTarget) -> Result<Vec<u8>, FetchError>;
}

/// [`UsageSource`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpUsageSource {
    client: reqwest::Client,
}

impl HttpUsageSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UsageSource for HttpUsageSource {
    async fn fetch_usage(&self, target: &UpstreamTarget) -> Result<Vec<u8>, FetchError> {
        let url = target.usage_url();
        debug!(%url, "fetching upstream usage");
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", target.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Body(err.to_string()))?;
        Ok(body.to_vec())
    }
}
