//! Suspension seam
//!
//! The rate limiter and the retry policy never call the runtime timer
//! directly; they suspend through a [`Sleeper`] so callers can observe or
//! replace the waits.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current task for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for exactly `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
