//! Injectable HTTP transport for the Hypothesis API client.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the underlying HTTP transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Failed to decode response body: {0}")]
    Decode(String),
}

/// A minimal GET-and-decode capability.
///
/// The group client issues every request through this trait so tests can
/// substitute a scripted transport. Retry and timeout policy belong to the
/// implementation, never to callers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request and decode the response body as JSON.
    async fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<serde_json::Value, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport with a dedicated connection pool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; SenseCard/1.0)")
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<serde_json::Value, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
