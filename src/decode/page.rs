//! Page decoding
//!
//! Absent keys follow an explicit policy instead of implicit lookups:
//! a missing or null `results` is an empty list, a missing, null or empty
//! `next_url` ends pagination. Anything structurally different is a
//! malformed response.

use crate::error::{Error, Result};
use crate::record::Record;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One page of the listing: ordered records plus an optional continuation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Records in upstream order
    pub records: Vec<Record>,
    /// Continuation cursor; `None` marks the final page
    pub next_cursor: Option<String>,
}

impl Page {
    /// Number of records on the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page carries no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether no further page exists
    pub fn is_final(&self) -> bool {
        self.next_cursor.is_none()
    }

    /// Stamp every record with the ingestion date
    pub fn stamp(&mut self, ds: &str) {
        for record in &mut self.records {
            record.ds = Some(ds.to_string());
        }
    }
}

/// Parse a raw response body into a [`Page`]
pub fn parse_page(body: &str) -> Result<Page> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::malformed(format!("body is not valid JSON: {e}")))?;

    let Value::Object(object) = value else {
        return Err(Error::malformed(format!(
            "expected a JSON object, got {}",
            kind(&value)
        )));
    };

    Ok(Page {
        records: extract_records(&object)?,
        next_cursor: extract_cursor(&object)?,
    })
}

fn extract_records(object: &Map<String, Value>) -> Result<Vec<Record>> {
    let items = match object.get("results") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(Error::malformed(format!(
                "'results' must be an array, got {}",
                kind(other)
            )))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(Error::malformed(format!(
                    "results[{index}] must be an object, got {}",
                    kind(item)
                )));
            }
            Record::deserialize(item)
                .map_err(|e| Error::malformed(format!("results[{index}]: {e}")))
        })
        .collect()
}

fn extract_cursor(object: &Map<String, Value>) -> Result<Option<String>> {
    match object.get("next_url") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::malformed(format!(
            "'next_url' must be a string, got {}",
            kind(other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
