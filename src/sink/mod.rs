//! Sink module
//!
//! Destinations for fetched pages.
//!
//! # Overview
//!
//! A [`RecordSink`] receives each page's records in order and stores them
//! durably before the next page is requested:
//! - [`CsvFileSink`] appends delimited rows to a local file
//! - [`WarehouseSink`] inserts into a warehouse table, one statement per page

mod csv_file;
mod warehouse;

pub use csv_file::CsvFileSink;
pub use warehouse::{create_table_sql, insert_sql, WarehouseSink, WarehouseTarget};

use crate::error::Result;
use crate::record::Record;

/// A destination for fetched records
pub trait RecordSink {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Store one page of records
    fn write_page(&mut self, records: &[Record]) -> Result<()>;

    /// Flush and release the destination. Further writes fail.
    fn close(&mut self) -> Result<()>;
}
