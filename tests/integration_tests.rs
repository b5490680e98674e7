//! Integration tests using mock HTTP server
//!
//! End-to-end flow: listing endpoint → paginated fetch → CSV file / warehouse table

use async_trait::async_trait;
use duckdb::Connection;
use serde_json::{json, Value};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use ticker_ingest::config::IngestConfig;
use ticker_ingest::http::{
    FixedWindowLimiter, HttpClient, RateLimiterConfig, RetryConfig, RetryPolicy, Sleeper,
};
use ticker_ingest::job;
use ticker_ingest::pagination::{PageRequest, PaginatedFetcher};
use ticker_ingest::sink::{CsvFileSink, WarehouseSink, WarehouseTarget};
use ticker_ingest::Error;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = "/v3/reference/tickers";

#[derive(Default)]
struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

fn fetcher(max_per_window: u32) -> (PaginatedFetcher, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = PaginatedFetcher::new(
        HttpClient::new("test-key").unwrap(),
        FixedWindowLimiter::new(RateLimiterConfig::new(max_per_window, 60)).unwrap(),
        RetryPolicy::new(RetryConfig::new(3, 10)).unwrap(),
    )
    .with_sleeper(sleeper.clone());
    (fetcher, sleeper)
}

fn ticker(symbol: &str) -> Value {
    json!({
        "ticker": symbol,
        "name": format!("{symbol} Index"),
        "market": "indices",
        "locale": "us",
        "active": true,
        "source_feed": "CMEMarketDataPlatformDowJones"
    })
}

/// Serve `pages` in order: page 0 has no cursor param, page i is at cursor `Ci`
async fn serve_pages(server: &MockServer, pages: &[Vec<&str>]) {
    for (i, symbols) in pages.iter().enumerate() {
        let mut body = json!({
            "results": symbols.iter().map(|s| ticker(s)).collect::<Vec<_>>(),
            "status": "OK",
        });
        if i + 1 < pages.len() {
            body["next_url"] = json!(format!("{}{LISTING}?cursor=C{}", server.uri(), i + 1));
        }

        let mock = Mock::given(method("GET"))
            .and(path(LISTING))
            .and(query_param("apiKey", "test-key"));
        let mock = if i == 0 {
            mock.and(query_param_is_missing("cursor"))
        } else {
            mock.and(query_param("cursor", format!("C{i}")))
        };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }
}

fn request(server: &MockServer) -> PageRequest {
    PageRequest::new(format!("{}{LISTING}", server.uri()))
        .filter("market", "indices")
        .filter("active", "true")
        .ingestion_date("2025-10-27")
}

// ============================================================================
// Fetch Scenarios
// ============================================================================

#[tokio::test]
async fn test_two_pages_into_csv_file() {
    let server = MockServer::start().await;
    serve_pages(&server, &[vec!["A1BSC", "A1CYC"], vec!["A1DOW"]]).await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("tickers.csv");
    let (fetcher, sleeper) = fetcher(5);

    let mut sink = CsvFileSink::open(&output).unwrap();
    let report = job::run(&fetcher, &request(&server), &mut sink)
        .await
        .unwrap();

    assert_eq!(report.records, 3);
    assert_eq!(report.pages, 2);
    assert!(sleeper.sleeps().is_empty());

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "ticker,name,market,locale,active,source_feed,ds");
    assert_eq!(
        lines[1],
        "A1BSC,A1BSC Index,indices,us,True,CMEMarketDataPlatformDowJones,2025-10-27"
    );
    assert!(lines[3].starts_with("A1DOW,"));
}

#[tokio::test]
async fn test_window_of_one_sleeps_before_every_continuation() {
    let server = MockServer::start().await;
    serve_pages(&server, &[vec!["A"], vec!["B"], vec!["C"]]).await;

    let (fetcher, sleeper) = fetcher(1);
    let total = fetcher
        .fetch_all(&request(&server), |_| Ok(()))
        .await
        .unwrap();

    assert_eq!(total, 3);
    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(60); 2]);
}

#[tokio::test]
async fn test_transient_errors_then_success() {
    let server = MockServer::start().await;
    serve_pages(&server, &[vec!["A"], vec!["B"]]).await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "C1"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;

    let (fetcher, sleeper) = fetcher(5);
    let mut tickers = Vec::new();
    let total = fetcher
        .fetch_all(&request(&server), |records| {
            tickers.extend(records.iter().filter_map(|r| r.ticker.clone()));
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(total, 2);
    assert_eq!(tickers, vec!["A", "B"]);
    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(10); 2]);
}

// ============================================================================
// Warehouse
// ============================================================================

#[tokio::test]
async fn test_pages_into_warehouse_table() {
    let server = MockServer::start().await;
    serve_pages(&server, &[vec!["A", "B"], vec!["C"]]).await;

    let dir = tempdir().unwrap();
    let db = dir.path().join("markets.duckdb");
    let target = WarehouseTarget::new(Some("raw"), "stock_tickers").unwrap();
    let (fetcher, _) = fetcher(5);

    let mut sink = WarehouseSink::open(&db, target).unwrap();
    let report = job::run(&fetcher, &request(&server), &mut sink)
        .await
        .unwrap();
    assert_eq!(report.records, 3);

    let conn = Connection::open(&db).unwrap();
    let mut stmt = conn
        .prepare("SELECT \"TICKER\", \"ACTIVE\", \"DS\" FROM raw.stock_tickers ORDER BY \"TICKER\"")
        .unwrap();
    let rows: Vec<(String, bool, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        rows,
        vec![
            ("A".to_string(), true, "2025-10-27".to_string()),
            ("B".to_string(), true, "2025-10-27".to_string()),
            ("C".to_string(), true, "2025-10-27".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_failed_run_keeps_rows_already_written() {
    let server = MockServer::start().await;
    // Second page advertised but always failing
    Mock::given(method("GET"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [ticker("A")],
            "next_url": format!("{}{LISTING}?cursor=BROKEN", server.uri()),
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "BROKEN"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("tickers.csv");
    let (fetcher, _) = fetcher(5);

    let mut sink = CsvFileSink::open(&output).unwrap();
    let err = job::run(&fetcher, &request(&server), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TransientFetch { attempts: 3, .. }));
    let content = fs::read_to_string(&output).unwrap();
    assert_eq!(content.lines().count(), 2);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_drives_first_request() {
    let config = IngestConfig::from_lookup(|key| match key {
        "POLYGON_API_KEY" => Some("k".to_string()),
        "TICKERS_MARKET" => Some("indices".to_string()),
        "TICKERS_PAGE_LIMIT" => Some("500".to_string()),
        _ => None,
    })
    .unwrap();

    let url = config.api.page_request().first_url().unwrap();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    assert!(pairs.contains(&("market".to_string(), "indices".to_string())));
    assert!(pairs.contains(&("limit".to_string(), "500".to_string())));
    assert!(!pairs.iter().any(|(k, _)| k == "apiKey"));
}
