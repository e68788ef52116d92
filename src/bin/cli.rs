//! Movie crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use movie_crawler::{
    error::Result,
    models::{Config, Field, merged_strategies},
    pipeline,
    services::{DetailPageParser, ListingPageParser, RecordAssembler},
};
use scraper::Html;

/// movie-crawler - yearly movie metadata crawler
#[derive(Parser, Debug)]
#[command(
    name = "movie-crawler",
    version,
    about = "Crawls yearly movie listings into a CSV table"
)]

struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every year in the configured range
    Crawl {
        /// First year (inclusive)
        #[arg(long)]
        start: Option<i32>,

        /// Last year (inclusive)
        #[arg(long)]
        end: Option<i32>,

        /// CSV output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON report path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Delay after every request in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Extract fields from a saved detail page
    Inspect {
        /// HTML file of a detail page
        file: PathBuf,

        /// Year to assemble the record with
        #[arg(long, default_value_t = 2000)]
        year: i32,
    },

    /// Validate configuration and compile every selector
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Crawl {
            start,
            end,
            output,
            report,
            delay_ms,
        } => {
            if let Some(year) = start {
                config.run.start_year = year;
            }
            if let Some(year) = end {
                config.run.end_year = year;
            }
            if let Some(path) = output {
                config.run.output = path;
            }
            if report.is_some() {
                config.run.report = report;
            }
            if let Some(ms) = delay_ms {
                config.crawler.request_delay_ms = ms;
            }

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            pipeline::run_crawler(&config).await?;
            log::info!("Crawl complete!");
        }

        Command::Inspect { file, year } => {
            let html = std::fs::read_to_string(&file)?;
            let document = Html::parse_document(&html);
            let parser = DetailPageParser::new(&merged_strategies(&config.strategies))?;

            for field in Field::ALL {
                match parser.resolve(field, &document) {
                    Some((tag, value)) => println!("{:<10} [{}] {}", field, tag, value),
                    None => println!("{:<10} -", field),
                }
            }

            let raw = parser.extract_fields(&document)?;
            println!();
            println!("resolved {}/{} fields", raw.resolved(), Field::ALL.len());
            let missing = raw.missing();
            if !missing.is_empty() {
                let names: Vec<_> = missing.iter().map(|f| f.key()).collect();
                println!("missing: {}", names.join(", "));
            }

            if let Some(record) = RecordAssembler::new().assemble(&raw, year) {
                println!();
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            ListingPageParser::new(&config.site)?;
            DetailPageParser::new(&merged_strategies(&config.strategies))?;

            log::info!("✓ Config OK (site layout and all field strategies compile)");
        }
    }

    Ok(())
}
