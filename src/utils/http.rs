// src/utils/http.rs

//! HTTP fetching behind the [`Fetcher`] seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Fetches the body of a page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Return the page body, or a transport error.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Fetcher`] backed by a configured reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::transport(url, e))?;

        response
            .text()
            .await
            .map_err(|e| AppError::transport(url, e))
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    let language = HeaderValue::from_str(&config.accept_language)
        .map_err(|e| AppError::config(format!("Invalid accept_language: {e}")))?;
    headers.insert(ACCEPT_LANGUAGE, language);

    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))
}

/// Retries transport failures with exponential backoff.
///
/// Waits `base`, `2 * base`, `4 * base`, ... between attempts and returns the
/// last error once `max_attempts` is exhausted.
pub struct RetryingFetcher<F> {
    inner: F,
    max_attempts: u32,
    base: Duration,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, max_attempts: u32, base: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            base,
        }
    }

    pub fn from_config(inner: F, config: &CrawlerConfig) -> Self {
        Self::new(
            inner,
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
        )
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(1 << (attempt - 1).min(16))
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transport() && attempt < self.max_attempts => {
                    let wait = self.backoff(attempt);
                    log::debug!(
                        "Attempt {attempt}/{} for {url} failed: {e}. Retrying in {wait:?}",
                        self.max_attempts
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
