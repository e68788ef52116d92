//! Persistence for exported tables and run reports.
//!
//! ```text
//! movies.csv        # one header row, then one row per record
//! report.json       # optional per-year outcome of the run
//! ```

pub mod local;

use crate::error::Result;
use crate::pipeline::Table;

pub use local::{CsvArtifact, write_report};

/// Destination for exported rows.
///
/// Appends must keep row order; the header is written once by the sink.
pub trait TableSink {
    fn append(&mut self, table: &Table) -> Result<()>;
}
