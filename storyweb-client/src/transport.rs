//! Network transports.
//!
//! The core only needs "GET this URL, give me decoded JSON". [`HttpTransport`]
//! does that with reqwest; [`CachedTransport`] wraps any transport with an
//! in-memory, per-URL response cache.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Fetches a URL and decodes the body as JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET. Fails with a transport error (no response, non-2xx)
    /// or a decode error (body is not JSON).
    async fn fetch(&self, url: &str) -> ClientResult<Value>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport using the config's user agent and timeout.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> ClientResult<Value> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("reading body of {url} failed: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("response from {url} is not JSON: {e}")))
    }
}

/// Wraps a transport with a process-lifetime response cache keyed by URL.
///
/// Only successful responses are cached.
pub struct CachedTransport<T> {
    inner: T,
    responses: RwLock<HashMap<String, Value>>,
}

impl<T: Transport> CachedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            responses: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached responses.
    pub async fn len(&self) -> usize {
        self.responses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.responses.read().await.is_empty()
    }

    /// Drops every cached response.
    pub async fn clear(&self) {
        self.responses.write().await.clear();
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for CachedTransport<T> {
    async fn fetch(&self, url: &str) -> ClientResult<Value> {
        if let Some(hit) = self.responses.read().await.get(url) {
            debug!("response cache hit: {}", url);
            return Ok(hit.clone());
        }

        debug!("response cache miss: {}", url);
        let value = self.inner.fetch(url).await?;
        self.responses
            .write()
            .await
            .insert(url.to_string(), value.clone());
        Ok(value)
    }
}
