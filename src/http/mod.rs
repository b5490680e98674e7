//! HTTP module
//!
//! Provides the single-attempt HTTP client, the bounded retry policy, the
//! fixed-window request limiter, and the suspension seam they share.
//!
//! # Features
//!
//! - **Retries**: Fixed backoff for transient transport failures only
//! - **Rate Limiting**: Count-based fixed window, sleep once the budget is spent
//! - **API keys**: Appended to every request URL, never logged

mod client;
mod rate_limit;
mod retry;
mod sleep;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{should_throttle, FixedWindowLimiter, RateLimiterConfig};
pub use retry::{RetryConfig, RetryPolicy};
pub use sleep::{Sleeper, TokioSleeper};
