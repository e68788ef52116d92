//! Local filesystem outputs.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::COLUMNS;
use crate::pipeline::Table;
use crate::storage::TableSink;

/// CSV artifact with the fixed movie header.
pub struct CsvArtifact<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl CsvArtifact<File> {
    /// Create (or truncate) the artifact at `path` and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> CsvArtifact<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(COLUMNS)?;
        writer.flush()?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::AppError::Io(e.into_error()))
    }
}

impl<W: Write> TableSink for CsvArtifact<W> {
    fn append(&mut self, table: &Table) -> Result<()> {
        for row in table.rows() {
            self.writer.write_record(row)?;
        }
        self.writer.flush()?;
        self.rows_written += table.len();
        Ok(())
    }
}

/// Write a JSON report next to the artifact.
pub fn write_report<T: Serialize>(path: impl AsRef<Path>, report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
