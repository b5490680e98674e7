//! One ingestion run: fetch every page into a sink
//!
//! The sink is closed on every exit path. When both the fetch and the close
//! fail, the fetch error is reported.

use crate::error::Result;
use crate::pagination::{PageRequest, PaginatedFetcher};
use crate::sink::RecordSink;
use tracing::{info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Sink the records went to
    pub sink: &'static str,
    /// Records stored
    pub records: usize,
    /// Pages stored
    pub pages: usize,
    /// Rate-limit window sleeps
    pub window_sleeps: u32,
}

/// Fetch all pages of `request` into `sink`, then close the sink
pub async fn run(
    fetcher: &PaginatedFetcher,
    request: &PageRequest,
    sink: &mut dyn RecordSink,
) -> Result<IngestReport> {
    let name = sink.name();
    info!(sink = name, "Starting ingestion");

    let fetched = fetcher
        .fetch(request, |records| sink.write_page(records))
        .await;
    let closed = sink.close();

    let summary = match (fetched, closed) {
        (Ok(summary), Ok(())) => summary,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), Ok(())) => return Err(e),
        (Err(e), Err(close_err)) => {
            warn!(sink = name, error = %close_err, "Sink close failed after fetch error");
            return Err(e);
        }
    };

    info!(
        sink = name,
        records = summary.records,
        pages = summary.pages,
        window_sleeps = summary.window_sleeps,
        "Ingestion finished"
    );

    Ok(IngestReport {
        sink: name,
        records: summary.records,
        pages: summary.pages,
        window_sleeps: summary.window_sleeps,
    })
}
