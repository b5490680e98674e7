//! Error types for ticker-ingest
//!
//! Every public API returns `Result<T, Error>`. The variants fall into four
//! families that surface to the top-level run: configuration, transient fetch
//! failures that exhausted their retry budget, malformed upstream responses,
//! and sink write failures. The single-attempt transport variants (`Http`,
//! `HttpStatus`, `Timeout`) only escape the retry wrapper when they are not
//! transient.

use thiserror::Error;

/// The main error type for ticker-ingest
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Transient fetch failure after {attempts} attempt(s): {source}")]
    TransientFetch {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ============================================================================
    // Sink Errors
    // ============================================================================
    #[error("Write to {sink} sink failed: {message}")]
    SinkWrite { sink: String, message: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a sink write error
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Wrap a transient failure that exhausted the retry budget
    pub fn transient(attempts: u32, source: Error) -> Self {
        Self::TransientFetch {
            attempts,
            source: Box::new(source),
        }
    }

    /// Whether a retry of the unchanged request may succeed.
    ///
    /// Only single-attempt transport failures qualify. Client errors
    /// (including 401/403), malformed bodies, configuration and sink failures
    /// never do.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }

    /// Whether this error belongs to the configuration family
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::MissingConfigField { .. } | Error::InvalidConfigValue { .. }
        )
    }
}

/// Server errors and explicit throttling responses are worth retrying
fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Result type alias for ticker-ingest
pub type Result<T> = std::result::Result<T, Error>;
