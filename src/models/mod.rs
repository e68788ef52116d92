// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod movie;
mod selectors;

// Re-export all public types
pub use config::{Config, CrawlerConfig, RunConfig, SiteConfig, YEAR_BOUNDS};
pub use movie::{COLUMNS, Field, MovieRecord, NOT_RATED, RawFieldMap};
pub use selectors::{
    Extraction, SelectorStrategy, StrategyTable, default_strategies, merged_strategies,
};
