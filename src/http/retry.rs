//! Bounded retry for transient failures
//!
//! Fixed backoff between attempts. Only errors classified by
//! [`Error::is_transient`] are retried; everything else propagates after the
//! first attempt.

use super::sleep::Sleeper;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Configuration for the retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config
    pub fn new(max_attempts: u32, backoff_seconds: u64) -> Self {
        Self {
            max_attempts,
            backoff: Duration::from_secs(backoff_seconds),
        }
    }
}

/// Retry wrapper around a single request operation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a policy; at least one attempt is required
    pub fn new(config: RetryConfig) -> Result<Self> {
        if config.max_attempts == 0 {
            return Err(Error::invalid_value(
                "max_attempts",
                "must be greater than zero",
            ));
        }
        Ok(Self { config })
    }

    /// Total attempts allowed
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Wait between attempts
    pub fn backoff(&self) -> Duration {
        self.config.backoff
    }

    /// Run `operation` until it succeeds, fails non-transiently, or the
    /// attempt budget is spent.
    ///
    /// `operation` receives the 1-based attempt number. An exhausted budget
    /// yields [`Error::TransientFetch`] wrapping the last failure.
    pub async fn with_retries<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => self.after_failure(sleeper, attempt, e).await?,
            }
            attempt += 1;
        }
    }

    /// Decide what follows a failed attempt.
    ///
    /// Returns `Ok(())` after sleeping the backoff when another attempt is
    /// allowed. Otherwise returns the error to propagate: `error` itself when
    /// it is not transient, or [`Error::TransientFetch`] once `attempt`
    /// reaches the budget.
    pub async fn after_failure(&self, sleeper: &dyn Sleeper, attempt: u32, error: Error) -> Result<()> {
        let max_attempts = self.config.max_attempts;

        if !error.is_transient() {
            return Err(error);
        }
        if attempt >= max_attempts {
            warn!(attempt, max_attempts, error = %error, "Giving up after transient failures");
            return Err(Error::transient(attempt, error));
        }

        warn!(
            attempt,
            max_attempts,
            backoff_secs = self.config.backoff.as_secs(),
            error = %error,
            "Transient failure, retrying"
        );
        sleeper.sleep(self.config.backoff).await;
        Ok(())
    }
}
