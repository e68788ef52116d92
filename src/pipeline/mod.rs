//! Pipeline entry points for crawler operations.
//!
//! - `YearRangeDriver`: crawl listings and detail pages for a year range
//! - `Aggregator`: collect records and export the fixed-schema table
//! - `run_crawler`: drive a configured run end to end and persist it

pub mod aggregate;
pub mod crawl;
pub mod driver;

pub use aggregate::{Aggregator, Table};
pub use crawl::run_crawler;
pub use driver::{
    RunOutcome, RunReport, SkippedItem, YearPhase, YearRangeDriver, YearReport, YearStatus,
};
