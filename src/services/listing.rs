//! Year listing page parsing.

use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SiteConfig;
use crate::utils::resolve_url;

/// Extracts detail-page URLs from a year listing.
#[derive(Debug)]
pub struct ListingPageParser {
    origin: Url,
    title_link: Regex,
    containers: Vec<Selector>,
    anchor: Selector,
}

impl ListingPageParser {
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let origin = Url::parse(&site.origin)?;
        let title_link = Regex::new(&site.title_link_pattern).map_err(|e| {
            AppError::config(format!(
                "Invalid title link pattern '{}': {e}",
                site.title_link_pattern
            ))
        })?;
        let containers = site
            .listing_containers
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            origin,
            title_link,
            containers,
            anchor: parse_selector("a[href]")?,
        })
    }

    /// Absolute detail URLs in first-seen order, without duplicates.
    ///
    /// An empty result is valid; a page without any listing container is not.
    pub fn extract_urls(&self, document: &Html, year: i32) -> Result<Vec<String>> {
        let containers: Vec<_> = self
            .containers
            .iter()
            .flat_map(|sel| document.select(sel))
            .collect();

        if containers.is_empty() {
            return Err(AppError::parse(
                format!("listing {year}"),
                "listing container not found",
            ));
        }

        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for container in containers {
            for anchor in container.select(&self.anchor) {
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                let Some(found) = self.title_link.find(href.trim()) else {
                    continue;
                };
                let reference = found.as_str();
                if seen.insert(reference.to_string()) {
                    urls.push(resolve_url(&self.origin, reference));
                }
            }
        }

        if urls.is_empty() {
            log::info!("No title links on the {year} listing");
        }
        Ok(urls)
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ListingPageParser {
        ListingPageParser::new(&SiteConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_dedups_and_absolutizes() {
        let html = r#"
            <div class="lister-list">
                <a href="/title/tt0080684/?ref_=adv_li_tt">The Empire Strikes Back</a>
                <a href="/title/tt0080684/?ref_=adv_li_i"><img></a>
                <a href="/name/nm0000184/">George Lucas</a>
                <a href="/title/tt0081505/">The Shining</a>
                <a>no href</a>
            </div>
        "#;
        let urls = parser()
            .extract_urls(&Html::parse_document(html), 1980)
            .unwrap();
        assert_eq!(
            urls,
            vec![
                "https://www.imdb.com/title/tt0080684/".to_string(),
                "https://www.imdb.com/title/tt0081505/".to_string(),
            ]
        );
    }

    #[test]
    fn test_links_outside_container_ignored() {
        let html = r#"
            <nav><a href="/title/tt9999999/">Trending</a></nav>
            <ul class="ipc-metadata-list"><li><a href="/title/tt0081505/">The Shining</a></li></ul>
        "#;
        let urls = parser()
            .extract_urls(&Html::parse_document(html), 1980)
            .unwrap();
        assert_eq!(urls, vec!["https://www.imdb.com/title/tt0081505/".to_string()]);
    }

    #[test]
    fn test_empty_listing_is_not_an_error() {
        let html = r#"<div class="lister-list"><p>No results.</p></div>"#;
        let urls = parser()
            .extract_urls(&Html::parse_document(html), 1895)
            .unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn test_missing_container_is_parse_error() {
        let html = r#"<html><body><h1>Service Unavailable</h1></body></html>"#;
        let err = parser()
            .extract_urls(&Html::parse_document(html), 1980)
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let site = SiteConfig {
            title_link_pattern: "(".to_string(),
            ..SiteConfig::default()
        };
        assert!(ListingPageParser::new(&site).is_err());
    }
}
