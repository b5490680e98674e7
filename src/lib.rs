// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # ticker-ingest
//!
//! Pulls a cursor-paged reference catalog (ticker listings) from an HTTP API
//! and stores it in an append-only CSV file or a warehouse table.
//!
//! ## Features
//!
//! - **Cursor pagination**: follows `next_url` until the listing is exhausted
//! - **Fixed-window rate limiting**: sleeps a full window once the request budget is spent
//! - **Bounded retries**: fixed backoff for timeouts, connection failures and 5xx
//! - **Pluggable sinks**: CSV file append or warehouse insert, one page at a time
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ticker_ingest::http::{FixedWindowLimiter, HttpClient, RateLimiterConfig, RetryConfig, RetryPolicy};
//! use ticker_ingest::pagination::{PageRequest, PaginatedFetcher};
//! use ticker_ingest::sink::{CsvFileSink, RecordSink};
//!
//! #[tokio::main]
//! async fn main() -> ticker_ingest::Result<()> {
//!     let fetcher = PaginatedFetcher::new(
//!         HttpClient::new("api-key")?,
//!         FixedWindowLimiter::new(RateLimiterConfig::new(5, 60))?,
//!         RetryPolicy::new(RetryConfig::new(3, 10))?,
//!     );
//!     let request = PageRequest::new("https://api.polygon.io/v3/reference/tickers")
//!         .filter("market", "indices");
//!
//!     let mut sink = CsvFileSink::open("tickers.csv")?;
//!     let total = fetcher.fetch_all(&request, |records| sink.write_page(records)).await?;
//!     sink.close()?;
//!     println!("stored {total} records");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌──────────────────────────────────────────┐    ┌────────────┐
//! │  config  │───▶│ PaginatedFetcher                         │───▶│ RecordSink │
//! │ (.env)   │    │  request → limiter → retry → decode page │    │ CSV file   │
//! └──────────┘    │  └──────── follow next_url ◀────────────┘│    │ Warehouse  │
//!                 └──────────────────────────────────────────┘    └────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Catalog record layout
pub mod record;

/// Response body decoding
pub mod decode;

/// HTTP client, retry policy and rate limiter
pub mod http;

/// Paginated fetch loop
pub mod pagination;

/// CSV and warehouse sinks
pub mod sink;

/// Environment configuration
pub mod config;

/// Fetch-into-sink orchestration
pub mod job;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use record::Record;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
