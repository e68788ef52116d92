//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::StrategyTable;

/// Years a listing can plausibly exist for.
pub const YEAR_BOUNDS: std::ops::RangeInclusive<i32> = 1870..=2100;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and politeness settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Target site layout
    #[serde(default)]
    pub site: SiteConfig,

    /// Batch range and outputs
    #[serde(default)]
    pub run: RunConfig,

    /// Per-field strategy chains replacing the built-in ones
    #[serde(default)]
    pub strategies: StrategyTable,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_attempts == 0 {
            return Err(AppError::validation("crawler.max_attempts must be > 0"));
        }
        if !self.site.listing_url_template.contains("{year}") {
            return Err(AppError::validation(
                "site.listing_url_template must contain {year}",
            ));
        }
        if self.site.listing_containers.is_empty() {
            return Err(AppError::validation("site.listing_containers is empty"));
        }
        for year in [self.run.start_year, self.run.end_year] {
            if !YEAR_BOUNDS.contains(&year) {
                return Err(AppError::validation(format!(
                    "run year {year} outside {}..={}",
                    YEAR_BOUNDS.start(),
                    YEAR_BOUNDS.end()
                )));
            }
        }
        if self.run.start_year > self.run.end_year {
            return Err(AppError::validation(format!(
                "run.start_year {} is after run.end_year {}",
                self.run.start_year, self.run.end_year
            )));
        }
        for (field, chain) in &self.strategies {
            if chain.is_empty() {
                return Err(AppError::validation(format!(
                    "strategies.{field} must list at least one strategy"
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client and politeness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header; labels are matched in English
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay after every fetch in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Attempts per URL; 1 disables retrying
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// First retry backoff, doubled on each further attempt
    #[serde(default = "defaults::backoff_base")]
    pub backoff_base_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_attempts: defaults::max_attempts(),
            backoff_base_ms: defaults::backoff_base(),
        }
    }
}

/// Layout of the movie database being crawled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host that relative title links are joined onto
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// Year listing URL; `{year}` is substituted
    #[serde(default = "defaults::listing_url_template")]
    pub listing_url_template: String,

    /// Regex a title link's href must match; the match is the canonical path
    #[serde(default = "defaults::title_link_pattern")]
    pub title_link_pattern: String,

    /// Wrapper selectors, one of which every valid listing page carries
    #[serde(default = "defaults::listing_containers")]
    pub listing_containers: Vec<String>,
}

impl SiteConfig {
    /// Listing URL for one year.
    pub fn listing_url(&self, year: i32) -> String {
        self.listing_url_template
            .replace("{year}", &year.to_string())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: defaults::origin(),
            listing_url_template: defaults::listing_url_template(),
            title_link_pattern: defaults::title_link_pattern(),
            listing_containers: defaults::listing_containers(),
        }
    }
}

/// Batch range and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "defaults::start_year")]
    pub start_year: i32,

    #[serde(default = "defaults::end_year")]
    pub end_year: i32,

    /// CSV artifact path
    #[serde(default = "defaults::output")]
    pub output: PathBuf,

    /// Optional JSON run report path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,

    /// Append each finished year to the artifact instead of writing once at the end
    #[serde(default = "defaults::flush_per_year")]
    pub flush_per_year: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_year: defaults::start_year(),
            end_year: defaults::end_year(),
            output: defaults::output(),
            report: None,
            flush_per_year: defaults::flush_per_year(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; movie-crawler/0.1)".into()
    }
    pub fn accept_language() -> String {
        "en-US,en;q=0.9".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn max_attempts() -> u32 {
        1
    }
    pub fn backoff_base() -> u64 {
        500
    }

    // Site defaults
    pub fn origin() -> String {
        "https://www.imdb.com".into()
    }
    pub fn listing_url_template() -> String {
        "https://www.imdb.com/search/title/?title_type=feature&release_date={year}-01-01,{year}-12-31&sort=num_votes,desc".into()
    }
    pub fn title_link_pattern() -> String {
        r"^/title/tt\d+/".into()
    }
    pub fn listing_containers() -> Vec<String> {
        vec![
            "div.lister-list".into(),
            "ul.ipc-metadata-list".into(),
        ]
    }

    // Run defaults
    pub fn start_year() -> i32 {
        1980
    }
    pub fn end_year() -> i32 {
        2020
    }
    pub fn output() -> PathBuf {
        PathBuf::from("movies.csv")
    }
    pub fn flush_per_year() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Extraction, Field};

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_reversed_years() {
        let mut config = Config::default();
        config.run.start_year = 2001;
        config.run.end_year = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_years_out_of_bounds() {
        let mut config = Config::default();
        config.run.start_year = i32::MIN;
        config.run.end_year = i32::MAX;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));

        let mut config = Config::default();
        config.run.start_year = 1999;
        config.run.end_year = 2101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_template_without_year() {
        let mut config = Config::default();
        config.site.listing_url_template = "https://example.com/list".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn listing_url_substitutes_every_year_placeholder() {
        let site = SiteConfig {
            listing_url_template: "https://example.com/{year}?from={year}".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(site.listing_url(1999), "https://example.com/1999?from=1999");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            request_delay_ms = 0

            [run]
            start_year = 1990
            end_year = 1991

            [[strategies.budget]]
            tag = "custom"
            selector = "td.budget"
            extract = { kind = "attr", name = "data-value" }
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.request_delay_ms, 0);
        assert_eq!(config.crawler.timeout_secs, 30);
        assert_eq!(config.run.start_year, 1990);
        assert_eq!(config.site.origin, "https://www.imdb.com");
        let budget = &config.strategies[&Field::Budget];
        assert_eq!(
            budget[0].extract,
            Extraction::Attr {
                name: "data-value".to_string()
            }
        );
        assert!(config.validate().is_ok());
    }
}
