// src/pipeline/driver.rs

//! Year range crawl driver.
//!
//! Years are processed strictly in order, one fetch at a time. Failures are
//! recovered at the smallest scope: a bad field becomes null, a bad detail
//! page skips one movie, a bad listing skips one year.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, MovieRecord, SiteConfig, YEAR_BOUNDS, merged_strategies};
use crate::pipeline::Aggregator;
use crate::services::{DetailPageParser, ListingPageParser, RecordAssembler};
use crate::storage::TableSink;
use crate::utils::http::Fetcher;

/// Processing phase of a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearPhase {
    Pending,
    FetchingListing,
    ParsingListing,
    FetchingDetail { index: usize, total: usize },
    Skipped,
    Done,
}

impl fmt::Display for YearPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearPhase::Pending => f.write_str("pending"),
            YearPhase::FetchingListing => f.write_str("fetching listing"),
            YearPhase::ParsingListing => f.write_str("parsing listing"),
            YearPhase::FetchingDetail { index, total } => {
                write!(f, "fetching detail {}/{}", index + 1, total)
            }
            YearPhase::Skipped => f.write_str("skipped"),
            YearPhase::Done => f.write_str("done"),
        }
    }
}

/// Final status of a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum YearStatus {
    Done,
    Skipped { reason: String },
}

/// A detail page that produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub url: String,
    pub reason: String,
}

/// Outcome of one year.
#[derive(Debug, Clone, Serialize)]
pub struct YearReport {
    pub year: i32,
    #[serde(flatten)]
    pub status: YearStatus,
    /// Detail links found on the listing
    pub listed: usize,
    /// Records assembled and collected
    pub collected: usize,
    pub skipped: Vec<SkippedItem>,
}

impl YearReport {
    fn new(year: i32) -> Self {
        Self {
            year,
            status: YearStatus::Done,
            listed: 0,
            collected: 0,
            skipped: Vec::new(),
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub start_year: i32,
    pub end_year: i32,
    pub records: usize,
    pub years: Vec<YearReport>,
}

impl RunReport {
    pub fn skipped_years(&self) -> usize {
        self.years
            .iter()
            .filter(|y| matches!(y.status, YearStatus::Skipped { .. }))
            .count()
    }

    pub fn skipped_items(&self) -> usize {
        self.years.iter().map(|y| y.skipped.len()).sum()
    }
}

/// Collected records together with the run report.
#[derive(Debug)]
pub struct RunOutcome {
    pub aggregator: Aggregator,
    pub report: RunReport,
}

impl RunOutcome {
    pub fn records(&self) -> &[MovieRecord] {
        self.aggregator.records()
    }
}

/// Drives listing and detail crawling over an inclusive year range.
pub struct YearRangeDriver<F> {
    fetcher: F,
    site: SiteConfig,
    listing: ListingPageParser,
    detail: DetailPageParser,
    assembler: RecordAssembler,
    delay: Duration,
}

impl<F: Fetcher> YearRangeDriver<F> {
    /// Build a driver, compiling every selector in the configuration.
    pub fn new(config: &Config, fetcher: F) -> Result<Self> {
        Ok(Self {
            fetcher,
            site: config.site.clone(),
            listing: ListingPageParser::new(&config.site)?,
            detail: DetailPageParser::new(&merged_strategies(&config.strategies))?,
            assembler: RecordAssembler::new(),
            delay: Duration::from_millis(config.crawler.request_delay_ms),
        })
    }

    /// Crawl `[start, end]` and keep every record in memory.
    pub async fn run(&self, start: i32, end: i32) -> Result<RunOutcome> {
        self.run_inner(start, end, None).await
    }

    /// Crawl `[start, end]`, appending each finished year to `sink`.
    pub async fn run_with_sink(
        &self,
        start: i32,
        end: i32,
        sink: &mut dyn TableSink,
    ) -> Result<RunOutcome> {
        self.run_inner(start, end, Some(sink)).await
    }

    async fn run_inner(
        &self,
        start: i32,
        end: i32,
        mut sink: Option<&mut dyn TableSink>,
    ) -> Result<RunOutcome> {
        if start > end {
            return Err(AppError::config(format!(
                "start year {start} is after end year {end}"
            )));
        }

        let started_at = Utc::now();
        if !YEAR_BOUNDS.contains(&start) || !YEAR_BOUNDS.contains(&end) {
            return Err(AppError::config(format!(
                "year range {start}..={end} outside {}..={}",
                YEAR_BOUNDS.start(),
                YEAR_BOUNDS.end()
            )));
        }
        let total = usize::try_from(i64::from(end) - i64::from(start) + 1).unwrap_or_default();
        let mut aggregator = Aggregator::new();
        let mut years = Vec::with_capacity(total);

        for (step, year) in (start..=end).enumerate() {
            crate::utils::log::step(step + 1, total, &format!("Year {year}"));
            let report = self.crawl_year(year, &mut aggregator).await;

            if let Some(sink) = sink.as_deref_mut() {
                sink.append(&aggregator.pending())?;
                aggregator.mark_flushed();
            }
            years.push(report);
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            start_year: start,
            end_year: end,
            records: aggregator.len(),
            years,
        };
        Ok(RunOutcome { aggregator, report })
    }

    async fn crawl_year(&self, year: i32, aggregator: &mut Aggregator) -> YearReport {
        let mut report = YearReport::new(year);
        enter(year, YearPhase::Pending);

        enter(year, YearPhase::FetchingListing);
        let listing_url = self.site.listing_url(year);
        let body = match self.fetch(&listing_url).await {
            Ok(body) => body,
            Err(e) => return skip_year(report, e),
        };

        enter(year, YearPhase::ParsingListing);
        let urls = {
            let document = Html::parse_document(&body);
            self.listing.extract_urls(&document, year)
        };
        let urls = match urls {
            Ok(urls) => urls,
            Err(e) => return skip_year(report, e),
        };
        report.listed = urls.len();

        for (index, url) in urls.iter().enumerate() {
            enter(year, YearPhase::FetchingDetail { index, total: urls.len() });
            match self.crawl_detail(url, year).await {
                Ok(record) => {
                    log::debug!("Collected '{}' ({year})", record.name());
                    aggregator.collect(record);
                    report.collected += 1;
                }
                Err(e) => {
                    if e.is_parse() {
                        log::warn!("Skipping {url}, page layout not recognized: {e}");
                    } else {
                        log::warn!("Skipping {url}: {e}");
                    }
                    report.skipped.push(SkippedItem {
                        url: url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        enter(year, YearPhase::Done);
        log::info!(
            "Year {year}: collected {} of {} listed movies",
            report.collected,
            report.listed
        );
        report
    }

    async fn crawl_detail(&self, url: &str, year: i32) -> Result<MovieRecord> {
        let body = self.fetch(url).await?;
        let document = Html::parse_document(&body);
        let raw = self.detail.extract_fields(&document)?;
        self.assembler
            .assemble(&raw, year)
            .ok_or_else(|| AppError::parse(url, "title resolved to an empty name"))
    }

    /// Fetch a page, then wait out the politeness delay regardless of outcome.
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {url}");
        let result = self.fetcher.fetch(url).await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        result
    }
}

fn enter(year: i32, phase: YearPhase) {
    log::debug!("Year {year}: {phase}");
}

fn skip_year(mut report: YearReport, error: AppError) -> YearReport {
    log::warn!("Skipping year {}: {error}", report.year);
    enter(report.year, YearPhase::Skipped);
    report.status = YearStatus::Skipped {
        reason: error.to_string(),
    };
    report
}
