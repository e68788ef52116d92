// src/pipeline/crawl.rs

//! End-to-end crawl: configured fetcher, driver, CSV artifact and report.

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{RunReport, YearRangeDriver};
use crate::storage::{CsvArtifact, TableSink, write_report};
use crate::utils::http::{Fetcher, HttpFetcher, RetryingFetcher};
use crate::utils::log;

/// Run the crawler over `config.run` using the live site.
pub async fn run_crawler(config: &Config) -> Result<RunReport> {
    let fetcher = RetryingFetcher::from_config(HttpFetcher::new(&config.crawler)?, &config.crawler);
    run_with_fetcher(config, fetcher).await
}

/// Run the crawler over `config.run` with any fetcher.
pub async fn run_with_fetcher<F: Fetcher>(config: &Config, fetcher: F) -> Result<RunReport> {
    let run = &config.run;
    log::header(&format!(
        "Crawling {}..={} into {}",
        run.start_year,
        run.end_year,
        run.output.display()
    ));

    let driver = YearRangeDriver::new(config, fetcher)?;
    let mut artifact = CsvArtifact::create(&run.output)?;

    let outcome = if run.flush_per_year {
        driver
            .run_with_sink(run.start_year, run.end_year, &mut artifact)
            .await?
    } else {
        let outcome = driver.run(run.start_year, run.end_year).await?;
        artifact.append(&outcome.aggregator.export())?;
        outcome
    };

    let report = outcome.report;
    if let Some(path) = &run.report {
        write_report(path, &report)?;
        ::log::info!("Report saved to {}", path.display());
    }

    log::summary(
        "Crawl",
        &[
            ("years", format!("{}", report.years.len())),
            ("skipped years", report.skipped_years().to_string()),
            ("records", artifact.rows_written().to_string()),
            ("skipped movies", report.skipped_items().to_string()),
            ("output", run.output.display().to_string()),
        ],
    );

    Ok(report)
}
