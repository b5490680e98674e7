//! HTTP client for the listing endpoint
//!
//! Makes exactly one attempt per call and classifies the outcome:
//! - 2xx: body returned as text
//! - other statuses: [`Error::HttpStatus`] with the response body
//! - timeouts: [`Error::Timeout`]
//! - other transport failures: [`Error::Http`]
//!
//! Retrying is the caller's decision (see [`super::RetryPolicy`]).

use crate::error::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Query parameter carrying the API key
    pub api_key_param: String,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            api_key_param: "apiKey".to_string(),
            user_agent: format!("ticker-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the API key query parameter name
    pub fn api_key_param(mut self, param: impl Into<String>) -> Self {
        self.config.api_key_param = param.into();
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Single-attempt GET client that signs every URL with the API key
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    api_key: String,
}

impl HttpClient {
    /// Create a client with the default configuration
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, HttpClientConfig::default())
    }

    /// Create a client with a custom configuration
    pub fn with_config(api_key: impl Into<String>, config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Append the API key to a URL
    pub fn sign(&self, url: &Url) -> Url {
        let mut signed = url.clone();
        signed
            .query_pairs_mut()
            .append_pair(&self.config.api_key_param, &self.api_key);
        signed
    }

    /// GET `url` once and return the body text
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(self.sign(url))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(Error::http_status(status.as_u16(), truncate(&body, 512)));
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Response received");
        Ok(body)
    }

    fn classify(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            // reqwest errors carry the signed URL
            Error::Http(e.without_url())
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod client_tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
