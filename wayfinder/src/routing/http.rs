//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::types::RoutingError;

/// Default HTTP timeout for routing requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with routing requests.
pub const DEFAULT_USER_AGENT: &str = concat!("wayfinder/", env!("CARGO_PKG_VERSION"));

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, RoutingError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with the default timeout.
    pub fn new() -> Result<Self, RoutingError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, RoutingError> {
        Self::with_settings(timeout, DEFAULT_USER_AGENT)
    }

    /// Creates a new client with a custom timeout and user agent.
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self, RoutingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RoutingError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, RoutingError> {
        trace!(url = url, "HTTP GET request starting");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = url, error = %e, "HTTP request failed");
            RoutingError::Http(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        debug!(url = url, status = status.as_u16(), "HTTP response received");

        // OSRM reports routing failures (e.g. NoRoute) as 400 with a JSON
        // body, so client errors are handed to the decoder as-is.
        if status.is_server_error() {
            return Err(RoutingError::Http(format!("HTTP {} from {}", status, url)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RoutingError::Http(format!("Failed to read response: {}", e)))?;

        if status.is_client_error() && bytes.is_empty() {
            return Err(RoutingError::Http(format!("HTTP {} from {}", status, url)));
        }

        Ok(bytes.to_vec())
    }
}
