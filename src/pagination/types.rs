//! Pagination types
//!
//! The initial request description and the transient per-run session.

use crate::error::{Error, Result};
use url::Url;

/// Largest page size the listing endpoint accepts
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Parameters of the first page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Listing endpoint
    pub base_url: String,
    /// Query filters, in order
    pub filters: Vec<(String, String)>,
    /// Page size, at most [`MAX_PAGE_LIMIT`]
    pub page_limit: u32,
    /// Date stamped on every record as `ds`
    pub ingestion_date: Option<String>,
}

impl PageRequest {
    /// Create a request for `base_url` with the maximum page size
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            filters: Vec::new(),
            page_limit: MAX_PAGE_LIMIT,
            ingestion_date: None,
        }
    }

    /// Add a query filter
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Set the page size
    #[must_use]
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the ingestion date stamped on records
    #[must_use]
    pub fn ingestion_date(mut self, ds: impl Into<String>) -> Self {
        self.ingestion_date = Some(ds.into());
        self
    }

    /// Build the first page URL: base, filters, then `limit`
    pub fn first_url(&self) -> Result<Url> {
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(Error::invalid_value(
                "page_limit",
                format!("must be between 1 and {MAX_PAGE_LIMIT}, got {}", self.page_limit),
            ));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.filters {
                query.append_pair(key, value);
            }
            query.append_pair("limit", &self.page_limit.to_string());
        }
        Ok(url)
    }
}

/// Per-run pagination state
///
/// Created at the start of a fetch, mutated by each request and sleep, and
/// discarded when the fetch returns. Nothing here is persisted.
#[derive(Debug, Clone, Default)]
pub struct FetchSession {
    requests_in_window: u32,
    cursor: Option<String>,
    requests: u32,
    pages: usize,
    records: usize,
    window_sleeps: u32,
}

impl FetchSession {
    /// Create a new session
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request about to be sent, retry attempts included
    pub fn record_request(&mut self) {
        self.requests_in_window += 1;
        self.requests += 1;
    }

    /// Start a new window after a sleep
    pub fn reset_window(&mut self) {
        self.requests_in_window = 0;
        self.window_sleeps += 1;
    }

    /// Count a forwarded page
    pub fn add_page(&mut self, records: usize) {
        self.pages += 1;
        self.records += records;
    }

    /// Store the continuation cursor of the latest page
    pub fn set_cursor(&mut self, cursor: Option<String>) {
        self.cursor = cursor;
    }

    /// Consume the pending cursor; a taken cursor is never handed out again
    pub fn take_cursor(&mut self) -> Option<String> {
        self.cursor.take()
    }

    /// Requests since the last window reset
    pub fn requests_in_window(&self) -> u32 {
        self.requests_in_window
    }

    /// Pending continuation cursor, if any
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Snapshot of the counters
    pub fn summary(&self) -> FetchSummary {
        FetchSummary {
            records: self.records,
            pages: self.pages,
            requests: self.requests,
            window_sleeps: self.window_sleeps,
        }
    }
}

/// Totals of a completed fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Records forwarded to the callback
    pub records: usize,
    /// Pages forwarded to the callback
    pub pages: usize,
    /// HTTP requests sent, retry attempts included
    pub requests: u32,
    /// Rate-limit window sleeps
    pub window_sleeps: u32,
}
