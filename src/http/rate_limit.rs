//! Rate limiting implementation
//!
//! Fixed-window limiter: the caller counts requests since the last sleep and,
//! once the count reaches the window budget, sleeps for the whole window and
//! resets its count. Window start times are not tracked, so a burst followed
//! by a full sleep counts the same as requests spread across the window.

use super::sleep::Sleeper;
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::info;

/// Configuration for rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of requests before the limiter sleeps
    pub max_requests_per_window: u32,
    /// Length of the sleep once the budget is spent
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: 5,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(max_requests_per_window: u32, window_seconds: u64) -> Self {
        Self {
            max_requests_per_window,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Reject zero budgets and zero-length windows
    pub fn validate(&self) -> Result<()> {
        if self.max_requests_per_window == 0 {
            return Err(Error::invalid_value(
                "max_requests_per_window",
                "must be greater than zero",
            ));
        }
        if self.window.is_zero() {
            return Err(Error::invalid_value(
                "window_seconds",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Whether `count` requests since the last reset exhaust the window budget
pub fn should_throttle(count: u32, max_per_window: u32) -> bool {
    count >= max_per_window
}

/// Count-based fixed-window limiter
#[derive(Debug, Clone)]
pub struct FixedWindowLimiter {
    config: RateLimiterConfig,
}

impl FixedWindowLimiter {
    /// Create a limiter, validating the config
    pub fn new(config: RateLimiterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Budget per window
    pub fn max_requests_per_window(&self) -> u32 {
        self.config.max_requests_per_window
    }

    /// Window length
    pub fn window(&self) -> Duration {
        self.config.window
    }

    /// Whether the next request has to wait for a new window
    pub fn should_throttle(&self, count: u32) -> bool {
        should_throttle(count, self.config.max_requests_per_window)
    }

    /// Sleep for one full window. The caller resets its count afterwards.
    pub async fn throttle(&self, sleeper: &dyn Sleeper) {
        info!(
            max_requests = self.config.max_requests_per_window,
            window_secs = self.config.window.as_secs(),
            "Request budget reached, sleeping for the window"
        );
        sleeper.sleep(self.config.window).await;
    }
}
