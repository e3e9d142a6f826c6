//! JSON fetch capability and its reqwest implementation

use crate::config::HttpConfig;
use crate::domain::{FetchError, Result, SyncError};
use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder};
use serde_json::{Map, Value};
use std::time::Duration;

/// GETs a URL and returns its JSON body
///
/// Implementations must not panic and must log failures themselves; callers
/// only decide whether a failure is fatal for them.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches and decodes a JSON document
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses and undecodable bodies are
    /// returned as [`FetchError`].
    async fn fetch(&self, url: &str) -> std::result::Result<Value, FetchError>;

    /// Like [`Fetcher::fetch`] but degrades any failure to an empty object
    async fn fetch_or_empty(&self, url: &str) -> Value {
        self.fetch(url)
            .await
            .unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// [`Fetcher`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the client with the configured timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] if the user agent is not a valid
    /// header value or the TLS backend cannot be initialised.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let user_agent = config.user_agent();
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        tracing::debug!(
            user_agent = %user_agent,
            timeout_seconds = config.timeout_seconds,
            "HTTP fetcher ready"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Value, FetchError> {
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            let err = FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            };
            tracing::warn!(url = %url, error = %err, "Backend request failed");
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            let err = FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };
            tracing::warn!(url = %url, status = status.as_u16(), "Backend returned an error status");
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(|e| {
            let err = FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            };
            tracing::warn!(url = %url, error = %err, "Failed to read backend response");
            err
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            let err = FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            };
            tracing::warn!(url = %url, error = %err, "Backend response is not JSON");
            err
        })
    }
}

/// Test double answering every request with `{}`
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingFetcher {
    urls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingFetcher {
    /// Requested URLs in request order
    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Value, FetchError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(Value::Object(Map::new()))
    }
}
