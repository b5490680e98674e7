//! Append-only CSV file sink

use super::RecordSink;
use crate::error::{Error, Result};
use crate::record::{self, Record};
use csv::{Writer, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SINK: &str = "file";

/// Appends records as CSV rows, syncing each row to disk
pub struct CsvFileSink {
    path: PathBuf,
    writer: Option<Writer<File>>,
    rows_written: usize,
    foreign_header: Option<String>,
}

impl CsvFileSink {
    /// Open `path` for appending. The header row is written only when the
    /// file is new or empty. An existing header that differs from the
    /// current layout is logged and kept; rows are appended regardless.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let needs_header = fs::metadata(&path).map_or(true, |m| m.len() == 0);

        let foreign_header = if needs_header {
            None
        } else {
            let existing = first_line(&path)?;
            let expected = record::header().join(",");
            if existing == expected {
                None
            } else {
                warn!(
                    path = %path.display(),
                    existing = %existing,
                    expected = %expected,
                    "Existing CSV header differs from the record layout"
                );
                Some(existing)
            }
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::sink(SINK, format!("failed to open {}: {e}", path.display())))?;

        let mut sink = Self {
            path,
            writer: Some(WriterBuilder::new().has_headers(false).from_writer(file)),
            rows_written: 0,
            foreign_header,
        };

        if needs_header {
            sink.append(record::header())?;
        }

        info!(path = %sink.path.display(), header = needs_header, "Opened CSV sink");
        Ok(sink)
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written since open
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Header line found in the file when it did not match the layout
    pub fn foreign_header(&self) -> Option<&str> {
        self.foreign_header.as_deref()
    }

    fn append<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::sink(SINK, "sink is closed"))?;

        writer
            .write_record(row)
            .map_err(|e| Error::sink(SINK, format!("failed to write row: {e}")))?;
        writer
            .flush()
            .map_err(|e| Error::sink(SINK, format!("failed to flush: {e}")))?;
        writer
            .get_ref()
            .sync_data()
            .map_err(|e| Error::sink(SINK, format!("failed to sync: {e}")))?;
        Ok(())
    }
}

fn first_line(path: &Path) -> Result<String> {
    let file = File::open(path)
        .map_err(|e| Error::sink(SINK, format!("failed to read {}: {e}", path.display())))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| Error::sink(SINK, format!("failed to read header: {e}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

impl RecordSink for CsvFileSink {
    fn name(&self) -> &'static str {
        SINK
    }

    fn write_page(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.append(record.to_row())?;
            self.rows_written += 1;
        }
        debug!(rows = records.len(), total = self.rows_written, "Appended rows");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let file = writer
                .into_inner()
                .map_err(|e| Error::sink(SINK, format!("failed to flush on close: {e}")))?;
            file.sync_all()
                .map_err(|e| Error::sink(SINK, format!("failed to sync on close: {e}")))?;
            info!(path = %self.path.display(), rows = self.rows_written, "Closed CSV sink");
        }
        Ok(())
    }
}

impl std::fmt::Debug for CsvFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvFileSink")
            .field("path", &self.path)
            .field("open", &self.writer.is_some())
            .field("rows_written", &self.rows_written)
            .field("foreign_header", &self.foreign_header)
            .finish()
    }
}
