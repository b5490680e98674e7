//! Catalog records
//!
//! A [`Record`] is one entry of the ticker reference catalog. Every field is
//! optional: keys missing from an upstream item become `None` and are written
//! as nulls (warehouse) or empty cells (CSV). Unknown upstream keys are
//! ignored.

use serde::{Deserialize, Serialize};

/// Column type used by sinks that need one (warehouse DDL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Free text
    Varchar,
    /// True/false flag
    Boolean,
}

impl ColumnType {
    /// SQL spelling of the type
    pub fn sql(self) -> &'static str {
        match self {
            Self::Varchar => "VARCHAR",
            Self::Boolean => "BOOLEAN",
        }
    }
}

/// A named, typed column of the fixed record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Field name as it appears upstream and in CSV headers
    pub name: &'static str,
    /// Storage type
    pub column_type: ColumnType,
}

/// The fixed, non-evolving record layout, in output order
pub const COLUMNS: [Column; 7] = [
    Column { name: "ticker", column_type: ColumnType::Varchar },
    Column { name: "name", column_type: ColumnType::Varchar },
    Column { name: "market", column_type: ColumnType::Varchar },
    Column { name: "locale", column_type: ColumnType::Varchar },
    Column { name: "active", column_type: ColumnType::Boolean },
    Column { name: "source_feed", column_type: ColumnType::Varchar },
    Column { name: "ds", column_type: ColumnType::Varchar },
];

/// A scalar cell value of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Absent upstream
    Null,
    /// Text value
    Text(&'a str),
    /// Boolean value
    Bool(bool),
}

impl FieldValue<'_> {
    /// Render the value as a CSV cell (nulls become empty cells)
    pub fn to_cell(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => (*s).to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub source_feed: Option<String>,
    /// Ingestion date (`YYYY-MM-DD`)
    #[serde(default)]
    pub ds: Option<String>,
}

impl Record {
    /// Create a record with only the ticker set
    pub fn with_ticker(ticker: impl Into<String>) -> Self {
        Self {
            ticker: Some(ticker.into()),
            ..Self::default()
        }
    }

    /// Stamp the ingestion date
    #[must_use]
    pub fn stamped(mut self, ds: &str) -> Self {
        self.ds = Some(ds.to_string());
        self
    }

    /// Values in [`COLUMNS`] order
    pub fn values(&self) -> [FieldValue<'_>; 7] {
        fn text(v: &Option<String>) -> FieldValue<'_> {
            v.as_deref().map_or(FieldValue::Null, FieldValue::Text)
        }

        [
            text(&self.ticker),
            text(&self.name),
            text(&self.market),
            text(&self.locale),
            self.active.map_or(FieldValue::Null, FieldValue::Bool),
            text(&self.source_feed),
            text(&self.ds),
        ]
    }

    /// CSV row in [`COLUMNS`] order
    pub fn to_row(&self) -> Vec<String> {
        self.values().iter().map(FieldValue::to_cell).collect()
    }
}

/// Header names in [`COLUMNS`] order
pub fn header() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_record_ignores_unknown_and_nulls_missing() {
        let record: Record = serde_json::from_value(json!({
            "ticker": "A1BSC",
            "name": "Dow Jones Americas Basic Materials Index",
            "market": "indices",
            "active": true,
            "currency_name": "usd"
        }))
        .unwrap();

        assert_eq!(record.ticker.as_deref(), Some("A1BSC"));
        assert_eq!(record.active, Some(true));
        assert!(record.locale.is_none());
        assert!(record.source_feed.is_none());
        assert!(record.ds.is_none());
    }

    #[test]
    fn test_record_row_order() {
        let record = Record {
            ticker: Some("AAPL".into()),
            name: Some("Apple Inc.".into()),
            market: Some("stocks".into()),
            locale: Some("us".into()),
            active: Some(false),
            source_feed: None,
            ds: None,
        }
        .stamped("2025-10-27");

        assert_eq!(
            record.to_row(),
            vec!["AAPL", "Apple Inc.", "stocks", "us", "False", "", "2025-10-27"]
        );
    }

    #[test]
    fn test_header_matches_columns() {
        assert_eq!(
            header(),
            vec!["ticker", "name", "market", "locale", "active", "source_feed", "ds"]
        );
    }
}
