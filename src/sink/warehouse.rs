//! Warehouse table sink
//!
//! Runs on the embedded DuckDB engine. The destination table is created on
//! first use with one column per known record field; the layout never
//! evolves. Each non-empty page becomes a single parameterised multi-row
//! `INSERT`.

use super::RecordSink;
use crate::error::{Error, Result};
use crate::record::{FieldValue, Record, COLUMNS};
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

const SINK: &str = "warehouse";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Destination table, optionally schema-qualified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseTarget {
    schema: Option<String>,
    table: String,
}

impl WarehouseTarget {
    /// Create a target; names must be plain SQL identifiers
    pub fn new(schema: Option<&str>, table: &str) -> Result<Self> {
        if let Some(schema) = schema {
            check_identifier("schema", schema)?;
        }
        check_identifier("table", table)?;
        Ok(Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        })
    }

    /// Schema name, if any
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// `schema.table` or `table`
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }
}

fn check_identifier(field: &str, value: &str) -> Result<()> {
    if IDENTIFIER.is_match(value) {
        Ok(())
    } else {
        Err(Error::invalid_value(
            field,
            format!("'{value}' is not a plain SQL identifier"),
        ))
    }
}

/// `CREATE TABLE IF NOT EXISTS` for the fixed record layout
pub fn create_table_sql(target: &WarehouseTarget) -> String {
    let columns = COLUMNS
        .iter()
        .map(|c| format!("\"{}\" {}", c.name.to_uppercase(), c.column_type.sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ( {columns} )",
        target.qualified()
    )
}

/// Multi-row `INSERT` with one placeholder per cell
pub fn insert_sql(target: &WarehouseTarget, rows: usize) -> String {
    let columns = COLUMNS
        .iter()
        .map(|c| format!("\"{}\"", c.name.to_uppercase()))
        .collect::<Vec<_>>()
        .join(", ");
    let row = format!("({})", vec!["?"; COLUMNS.len()].join(", "));
    let values = vec![row; rows].join(", ");
    format!(
        "INSERT INTO {} ( {columns} ) VALUES {values}",
        target.qualified()
    )
}

/// Inserts pages into a warehouse table
pub struct WarehouseSink {
    conn: Option<Connection>,
    target: WarehouseTarget,
    table_ready: bool,
    rows_inserted: usize,
}

impl WarehouseSink {
    /// Open (or create) the database file at `path`
    pub fn open(path: impl AsRef<Path>, target: WarehouseTarget) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::sink(SINK, format!("failed to open {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), table = %target.qualified(), "Opened warehouse sink");
        Ok(Self::with_connection(conn, target))
    }

    /// Wrap an existing connection
    pub fn with_connection(conn: Connection, target: WarehouseTarget) -> Self {
        Self {
            conn: Some(conn),
            target,
            table_ready: false,
            rows_inserted: 0,
        }
    }

    /// Destination table
    pub fn target(&self) -> &WarehouseTarget {
        &self.target
    }

    /// Rows inserted since open
    pub fn rows_inserted(&self) -> usize {
        self.rows_inserted
    }

    fn connection(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::sink(SINK, "sink is closed"))
    }

    fn ensure_table(&mut self) -> Result<()> {
        if self.table_ready {
            return Ok(());
        }

        let conn = self.connection()?;
        if let Some(schema) = self.target.schema() {
            conn.execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))
                .map_err(|e| Error::sink(SINK, format!("failed to create schema: {e}")))?;
        }
        conn.execute_batch(&create_table_sql(&self.target))
            .map_err(|e| Error::sink(SINK, format!("failed to create table: {e}")))?;

        debug!(table = %self.target.qualified(), "Destination table ready");
        self.table_ready = true;
        Ok(())
    }
}

fn to_sql_value(value: &FieldValue<'_>) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(s) => Value::Text((*s).to_string()),
        FieldValue::Bool(b) => Value::Boolean(*b),
    }
}

impl RecordSink for WarehouseSink {
    fn name(&self) -> &'static str {
        SINK
    }

    fn write_page(&mut self, records: &[Record]) -> Result<()> {
        self.ensure_table()?;
        if records.is_empty() {
            return Ok(());
        }

        let sql = insert_sql(&self.target, records.len());
        let params = records
            .iter()
            .flat_map(|r| r.values().iter().map(to_sql_value).collect::<Vec<_>>());

        let inserted = self
            .connection()?
            .execute(&sql, params_from_iter(params))
            .map_err(|e| Error::sink(SINK, format!("insert failed: {e}")))?;

        self.rows_inserted += inserted;
        debug!(rows = inserted, total = self.rows_inserted, "Inserted page");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .map_err(|(_, e)| Error::sink(SINK, format!("failed to close: {e}")))?;
            info!(table = %self.target.qualified(), rows = self.rows_inserted, "Closed warehouse sink");
        }
        Ok(())
    }
}

impl std::fmt::Debug for WarehouseSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseSink")
            .field("target", &self.target)
            .field("open", &self.conn.is_some())
            .field("table_ready", &self.table_ready)
            .field("rows_inserted", &self.rows_inserted)
            .finish()
    }
}
