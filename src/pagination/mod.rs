//! Pagination module
//!
//! Drives a cursor-paged listing endpoint to completion.
//!
//! # Overview
//!
//! [`PaginatedFetcher::fetch_all`] issues the initial request, hands each page
//! to a callback, follows the continuation cursor, sleeps whenever the
//! fixed-window budget is spent, and retries transient failures. A
//! [`FetchSession`] holds the per-run state and is dropped when the run ends.

mod fetcher;
mod types;

pub use fetcher::PaginatedFetcher;
pub use types::{FetchSession, FetchSummary, PageRequest, MAX_PAGE_LIMIT};
