//! Paginated fetch loop

use super::types::{FetchSession, FetchSummary, PageRequest};
use crate::decode::{parse_page, Page};
use crate::error::{Error, Result};
use crate::http::{FixedWindowLimiter, HttpClient, RetryPolicy, Sleeper, TokioSleeper};
use crate::record::Record;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Fetches every page of a cursor-paged listing, one request at a time
pub struct PaginatedFetcher {
    client: HttpClient,
    limiter: FixedWindowLimiter,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl PaginatedFetcher {
    /// Create a fetcher that sleeps on the tokio timer
    pub fn new(client: HttpClient, limiter: FixedWindowLimiter, retry: RetryPolicy) -> Self {
        Self {
            client,
            limiter,
            retry,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the sleeper used for window and backoff waits
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Fetch all pages and return the number of records forwarded
    pub async fn fetch_all<F>(&self, request: &PageRequest, on_page: F) -> Result<usize>
    where
        F: FnMut(&[Record]) -> Result<()>,
    {
        self.fetch(request, on_page).await.map(|summary| summary.records)
    }

    /// Fetch all pages and return the run totals.
    ///
    /// `on_page` runs once per page, in order, before the next request is
    /// issued; an error from it aborts the fetch. The first page is forwarded
    /// even when empty. A later page with no records ends the fetch without
    /// being forwarded.
    pub async fn fetch<F>(&self, request: &PageRequest, mut on_page: F) -> Result<FetchSummary>
    where
        F: FnMut(&[Record]) -> Result<()>,
    {
        let first_url = request.first_url()?;
        let mut session = FetchSession::new();

        info!(url = %first_url, "Requesting first page");
        let page = self.request_page(&first_url, &mut session).await?;
        self.forward(page, request, &mut session, &mut on_page)?;

        while let Some(cursor) = session.take_cursor() {
            let url = continuation_url(&first_url, &cursor)?;
            debug!(url = %url, "Requesting next page");
            let page = self.request_page(&url, &mut session).await?;

            if page.is_empty() {
                info!("Empty results, stopping pagination");
                break;
            }
            self.forward(page, request, &mut session, &mut on_page)?;
        }

        let summary = session.summary();
        info!(
            records = summary.records,
            pages = summary.pages,
            requests = summary.requests,
            window_sleeps = summary.window_sleeps,
            "Fetch complete"
        );
        Ok(summary)
    }

    /// One logical request: every attempt, retries included, passes the
    /// window check and is counted before it is sent
    async fn request_page(&self, url: &Url, session: &mut FetchSession) -> Result<Page> {
        let sleeper = self.sleeper.as_ref();
        let mut attempt = 1;

        let body = loop {
            if self.limiter.should_throttle(session.requests_in_window()) {
                self.limiter.throttle(sleeper).await;
                session.reset_window();
            }

            session.record_request();
            match self.client.get_text(url).await {
                Ok(body) => break body,
                Err(e) => self.retry.after_failure(sleeper, attempt, e).await?,
            }
            attempt += 1;
        };

        parse_page(&body)
    }

    fn forward<F>(
        &self,
        mut page: Page,
        request: &PageRequest,
        session: &mut FetchSession,
        on_page: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&[Record]) -> Result<()>,
    {
        if let Some(ds) = &request.ingestion_date {
            page.stamp(ds);
        }

        on_page(&page.records)?;
        session.add_page(page.len());
        info!(
            page = session.summary().pages,
            records = page.len(),
            has_next = !page.is_final(),
            "Page stored"
        );

        session.set_cursor(page.next_cursor);
        Ok(())
    }
}

/// Resolve the server-supplied cursor against the first page URL
fn continuation_url(base: &Url, cursor: &str) -> Result<Url> {
    base.join(cursor)
        .map_err(|e| Error::malformed(format!("next_url '{cursor}' is not a valid URL: {e}")))
}

impl std::fmt::Debug for PaginatedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedFetcher")
            .field("client", &self.client)
            .field("limiter", &self.limiter)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
