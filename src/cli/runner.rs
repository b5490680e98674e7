//! CLI runner - executes the ingestion job

use crate::cli::commands::{Cli, SinkKind};
use crate::config::{load_dotenv, IngestConfig, WarehouseConfig};
use crate::error::Result;
use crate::http::{FixedWindowLimiter, HttpClient, HttpClientConfig, RetryPolicy};
use crate::job::{self, IngestReport};
use crate::pagination::PaginatedFetcher;
use crate::sink::{CsvFileSink, RecordSink, WarehouseSink};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load configuration, open the sink, and run the job
    pub async fn run(&self) -> Result<IngestReport> {
        load_dotenv(self.cli.env_file.as_deref())?;

        // All configuration is validated before any network or file I/O
        let config = IngestConfig::from_env()?;
        let warehouse = match self.cli.sink {
            SinkKind::Warehouse => Some(WarehouseConfig::from_env()?),
            SinkKind::File => None,
        };

        let fetcher = build_fetcher(&config)?;
        let request = config
            .api
            .page_request()
            .ingestion_date(chrono::Local::now().format("%Y-%m-%d").to_string());

        let mut sink = open_sink(&config, warehouse.as_ref())?;
        let report = job::run(&fetcher, &request, sink.as_mut()).await?;

        info!(
            sink = report.sink,
            records = report.records,
            pages = report.pages,
            "Done"
        );
        Ok(report)
    }
}

/// Assemble client, limiter and retry policy from config
fn build_fetcher(config: &IngestConfig) -> Result<PaginatedFetcher> {
    let client = HttpClient::with_config(
        &config.api.api_key,
        HttpClientConfig::builder()
            .timeout(config.http_timeout)
            .build(),
    )?;
    let limiter = FixedWindowLimiter::new(config.rate_limit)?;
    let retry = RetryPolicy::new(config.retry)?;
    Ok(PaginatedFetcher::new(client, limiter, retry))
}

fn open_sink(
    config: &IngestConfig,
    warehouse: Option<&WarehouseConfig>,
) -> Result<Box<dyn RecordSink>> {
    match warehouse {
        Some(wh) => {
            info!(
                account = %wh.account,
                user = %wh.user,
                warehouse = wh.warehouse.as_deref().unwrap_or("-"),
                role = wh.role.as_deref().unwrap_or("-"),
                database = %wh.database,
                "Connecting to warehouse"
            );
            Ok(Box::new(WarehouseSink::open(
                wh.database_path(),
                wh.target()?,
            )?))
        }
        None => Ok(Box::new(CsvFileSink::open(&config.output_file)?)),
    }
}
