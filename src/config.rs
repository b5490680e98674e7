//! Configuration loaded from the environment
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file. Parsing is written against a lookup function so the same
//! code serves the real environment and tests. Every problem is reported as
//! a configuration error before any network or file I/O happens.

use crate::error::{Error, Result};
use crate::http::{RateLimiterConfig, RetryConfig};
use crate::pagination::{PageRequest, MAX_PAGE_LIMIT};
use crate::sink::WarehouseTarget;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Default listing endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io/v3/reference/tickers";

/// Default warehouse table
pub const DEFAULT_TABLE: &str = "stock_tickers";

/// Default CSV output file
pub const DEFAULT_OUTPUT_FILE: &str = "tickers.csv";

// ============================================================================
// .env Loading
// ============================================================================

/// Load `path` (or `./.env`) into the process environment.
///
/// A missing file is not an error; existing variables are not overridden.
pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match result {
        Ok(loaded) => {
            debug!(path = %loaded.display(), "Loaded .env file");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::config(format!("Failed to load .env file: {e}"))),
    }
}

// ============================================================================
// Lookup Helpers
// ============================================================================

/// Non-empty value for `key`
fn lookup_value<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup_value(lookup, key).ok_or_else(|| Error::missing_field(key))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup_value(lookup, key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::invalid_value(key, format!("'{raw}': {e}"))),
        None => Ok(default),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

// ============================================================================
// API Config
// ============================================================================

/// Upstream listing API settings
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API key appended to every request
    pub api_key: String,
    /// Listing endpoint
    pub base_url: String,
    /// `market` filter
    pub market: String,
    /// `active` filter
    pub active: bool,
    /// Page size
    pub page_limit: u32,
}

impl ApiConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_limit = parsed(lookup, "TICKERS_PAGE_LIMIT", MAX_PAGE_LIMIT)?;
        if page_limit == 0 || page_limit > MAX_PAGE_LIMIT {
            return Err(Error::invalid_value(
                "TICKERS_PAGE_LIMIT",
                format!("must be between 1 and {MAX_PAGE_LIMIT}"),
            ));
        }

        Ok(Self {
            api_key: required(lookup, "POLYGON_API_KEY")?,
            base_url: lookup_value(lookup, "TICKERS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            market: lookup_value(lookup, "TICKERS_MARKET").unwrap_or_else(|| "stocks".to_string()),
            active: parsed(lookup, "TICKERS_ACTIVE", true)?,
            page_limit,
        })
    }

    /// First page request: filters in upstream order, ascending by ticker
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(&self.base_url)
            .filter("market", &self.market)
            .filter("active", self.active.to_string())
            .filter("order", "asc")
            .filter("sort", "ticker")
            .page_limit(self.page_limit)
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("market", &self.market)
            .field("active", &self.active)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

// ============================================================================
// Ingest Config
// ============================================================================

/// Everything the fetch side of a run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Upstream API
    pub api: ApiConfig,
    /// Fixed-window budget
    pub rate_limit: RateLimiterConfig,
    /// Transient failure retries
    pub retry: RetryConfig,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// CSV sink output path
    pub output_file: PathBuf,
}

impl IngestConfig {
    /// Read from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Read through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rate_limit = RateLimiterConfig::new(
            parsed(&lookup, "RATE_LIMIT_MAX_REQUESTS", 5)?,
            parsed(&lookup, "RATE_LIMIT_WINDOW_SECS", 60)?,
        );
        rate_limit.validate()?;

        let retry = RetryConfig::new(
            parsed(&lookup, "RETRY_MAX_ATTEMPTS", 3)?,
            parsed(&lookup, "RETRY_BACKOFF_SECS", 10)?,
        );
        if retry.max_attempts == 0 {
            return Err(Error::invalid_value(
                "RETRY_MAX_ATTEMPTS",
                "must be greater than zero",
            ));
        }

        let timeout_secs: u64 = parsed(&lookup, "HTTP_TIMEOUT_SECS", 15)?;
        if timeout_secs == 0 {
            return Err(Error::invalid_value(
                "HTTP_TIMEOUT_SECS",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            api: ApiConfig::from_lookup(&lookup)?,
            rate_limit,
            retry,
            http_timeout: Duration::from_secs(timeout_secs),
            output_file: lookup_value(&lookup, "OUTPUT_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE), PathBuf::from),
        })
    }
}

// ============================================================================
// Warehouse Config
// ============================================================================

/// Warehouse connection parameters
///
/// The sink runs on an embedded DuckDB file, so `account`, `user`,
/// `password`, `warehouse` and `role` are required or validated as usual but
/// never used to connect. Only `database` (which names the default file),
/// `schema`, `table` and `path` affect where rows land.
#[derive(Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// Account identifier
    pub account: String,
    /// User name
    pub user: String,
    /// Password
    pub password: String,
    /// Compute warehouse name
    pub warehouse: Option<String>,
    /// Database name
    pub database: String,
    /// Schema name
    pub schema: Option<String>,
    /// Access role
    pub role: Option<String>,
    /// Destination table
    pub table: String,
    /// Override for the embedded database file
    pub path: Option<PathBuf>,
}

impl WarehouseConfig {
    /// Read from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Read through `lookup`. Account, user, password and database are
    /// mandatory.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            account: required(&lookup, "WAREHOUSE_ACCOUNT")?,
            user: required(&lookup, "WAREHOUSE_USER")?,
            password: required(&lookup, "WAREHOUSE_PASSWORD")?,
            warehouse: lookup_value(&lookup, "WAREHOUSE_NAME"),
            database: required(&lookup, "WAREHOUSE_DATABASE")?,
            schema: lookup_value(&lookup, "WAREHOUSE_SCHEMA"),
            role: lookup_value(&lookup, "WAREHOUSE_ROLE"),
            table: lookup_value(&lookup, "WAREHOUSE_TABLE")
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            path: lookup_value(&lookup, "WAREHOUSE_PATH").map(PathBuf::from),
        };

        // Surface bad identifiers now rather than at the first insert
        config.target()?;
        Ok(config)
    }

    /// Destination table
    pub fn target(&self) -> Result<WarehouseTarget> {
        WarehouseTarget::new(self.schema.as_deref(), &self.table)
    }

    /// Embedded database file: the override, else `<database>.duckdb`
    pub fn database_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.duckdb", self.database)))
    }
}

impl std::fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("role", &self.role)
            .field("table", &self.table)
            .field("path", &self.path)
            .finish()
    }
}
