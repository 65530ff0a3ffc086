//! HTTP client used to poll update sources.
//!
//! A thin wrapper around reqwest that:
//! - always verifies TLS certificates
//! - applies a default timeout and user agent
//! - turns per-package `RequestOptions` into a single request

use crate::config::{NetworkConfig, RequestOptions};
use crate::{Result, UpdaterError};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// HTTP client for update checks.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    /// Default timeout for requests.
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a new HTTP client with a custom default timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::with_options(timeout, NetworkConfig::USER_AGENT)
    }

    /// Create a new HTTP client with a custom timeout and user agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .danger_accept_invalid_certs(false)
            .build()
            .map_err(|e| UpdaterError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Get a reference to the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Send exactly one request to `url` shaped by `options`.
    ///
    /// Any response, whatever its status, is returned to the caller.
    pub async fn send(&self, url: &str, options: &RequestOptions) -> Result<Response> {
        let method = options.http_method()?;
        debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }
        if let Some(timeout) = options.timeout() {
            request = request.timeout(timeout);
        }

        request.send().await.map_err(|e| UpdaterError::Network {
            message: format!("{} {} failed: {}", method, url, e),
            source: Some(e),
        })
    }
}

/// Extract domain from a URL.
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.host_str().unwrap_or("unknown").to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://api.github.com/repos/foo/bar/tags"),
            "api.github.com"
        );
        assert_eq!(
            extract_domain("https://updates.example.com/theme.json"),
            "updates.example.com"
        );
        assert_eq!(extract_domain("invalid-url"), "unknown");
    }

    #[tokio::test]
    async fn test_client_with_timeout() {
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(client.default_timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_method() {
        let client = HttpClient::new().unwrap();
        let options = RequestOptions {
            method: "NOT A METHOD".to_string(),
            ..Default::default()
        };
        let result = client.send("http://127.0.0.1:9/update.json", &options).await;
        assert!(matches!(result, Err(UpdaterError::Config { .. })));
    }
}
