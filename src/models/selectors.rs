//! Extraction strategies for detail-page fields.
//!
//! The site has gone through several markup generations, so each field owns
//! an ordered chain of strategies. Chains are tried front to back and the
//! first strategy producing a usable value wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Field;

/// How a value is read from a matched node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    /// Whitespace-normalized text content of the node
    Text,

    /// Value of the named attribute
    Attr { name: String },

    /// First non-empty text of the node's following sibling
    NextSibling,
}

/// One tagged extraction rule for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorStrategy {
    /// Markup generation this rule targets (e.g. "hero-v3")
    pub tag: String,

    /// CSS selector for the node to read
    pub selector: String,

    /// Accepted label texts; when non-empty the node's own text must match one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    #[serde(default = "default_extraction")]
    pub extract: Extraction,

    /// Regex removed from the extracted text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip: Option<String>,

    /// Placeholder values that count as "not found"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reject: Vec<String>,
}

fn default_extraction() -> Extraction {
    Extraction::Text
}

impl SelectorStrategy {
    /// Read the text of the first node matching `selector`.
    pub fn text(tag: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            selector: selector.into(),
            labels: Vec::new(),
            extract: Extraction::Text,
            strip: None,
            reject: Vec::new(),
        }
    }

    /// Read an attribute of the first node matching `selector`.
    pub fn attr(tag: impl Into<String>, selector: impl Into<String>, name: &str) -> Self {
        Self {
            extract: Extraction::Attr {
                name: name.to_string(),
            },
            ..Self::text(tag, selector)
        }
    }

    /// Find a label node among `selector` matches and read its next sibling.
    pub fn labelled(tag: impl Into<String>, selector: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            extract: Extraction::NextSibling,
            ..Self::text(tag, selector)
        }
    }

    pub fn with_strip(mut self, pattern: impl Into<String>) -> Self {
        self.strip = Some(pattern.into());
        self
    }

    pub fn with_reject(mut self, values: &[&str]) -> Self {
        self.reject = values.iter().map(|v| v.to_string()).collect();
        self
    }
}

/// Strategy chains for every field.
pub type StrategyTable = BTreeMap<Field, Vec<SelectorStrategy>>;

/// Default chains, newest markup first.
pub fn default_strategies() -> StrategyTable {
    Field::ALL
        .into_iter()
        .map(|field| (field, defaults::chain(field)))
        .collect()
}

/// Default chains with the configured overrides swapped in per field.
pub fn merged_strategies(overrides: &StrategyTable) -> StrategyTable {
    let mut table = default_strategies();
    for (field, chain) in overrides {
        table.insert(*field, chain.clone());
    }
    table
}

mod defaults {
    use super::SelectorStrategy as S;
    use crate::models::Field;

    const PRINCIPAL_LABEL: &str =
        "li[data-testid='title-pc-principal-credit'] > .ipc-metadata-list-item__label";
    const LEGACY_CREDIT_LABEL: &str = "div.credit_summary_item > h4.inline";
    const LEGACY_DETAIL_LABEL: &str = "div.txt-block > h4.inline";
    const CREDIT_LABELS: [&str; 6] =
        ["Director", "Directors", "Writer", "Writers", "Star", "Stars"];

    fn details_label(testid: &str) -> String {
        format!("li[data-testid='{testid}'] > .ipc-metadata-list-item__label")
    }

    pub fn chain(field: Field) -> Vec<S> {
        match field {
            Field::Name => vec![
                S::text(
                    "hero-v3",
                    "h1[data-testid='hero__pageTitle'] span.hero__primary-text",
                ),
                S::text("title-block-v2", "h1[data-testid='hero-title-block__title']"),
                S::text("legacy-v1", "div.title_wrapper > h1")
                    .with_strip(r"\s*\(\d{4}\)\s*$"),
            ],
            Field::Rating => vec![
                S::text(
                    "hero-v3",
                    "ul[data-testid='hero-title-block__metadata'] a[href*='/parentalguide/certificates']",
                ),
                S::labelled(
                    "details-v2",
                    details_label("title-details-certificate"),
                    &["Certificate", "Rated"],
                ),
                S::attr("legacy-v1", "meta[itemprop='contentRating']", "content"),
            ],
            Field::Genre => vec![
                S::text("hero-v3", "div[data-testid='interests'] a.ipc-chip > span"),
                S::text("title-block-v2", "div[data-testid='genres'] a > span"),
                S::text("legacy-v1", "div.subtext > a[href*='genre']"),
            ],
            Field::Released => vec![
                S::labelled(
                    "details-v2",
                    details_label("title-details-releasedate"),
                    &["Release date"],
                ),
                S::text("legacy-v1", "a[title='See more release dates']"),
            ],
            Field::Score => vec![
                S::text(
                    "hero-v3",
                    "div[data-testid='hero-rating-bar__aggregate-rating__score'] > span",
                ),
                S::text("legacy-v1", "span[itemprop='ratingValue']"),
            ],
            Field::Votes => vec![
                S::text(
                    "hero-v3",
                    "div[data-testid='hero-rating-bar__aggregate-rating__score'] + div + div",
                ),
                S::text("legacy-v1", "span[itemprop='ratingCount']"),
            ],
            Field::Director => vec![
                S::labelled("credits-v2", PRINCIPAL_LABEL, &["Director", "Directors"]),
                S::labelled("legacy-v1", LEGACY_CREDIT_LABEL, &["Director", "Directors"]),
            ],
            // The byline only takes a singular "Writer" credit. A "Writers"
            // label marks several credits and falls through to the labelled
            // lookup, which reads the first credited name.
            Field::Writer => vec![
                S::labelled("byline-v2", PRINCIPAL_LABEL, &["Writer"])
                    .with_reject(&CREDIT_LABELS),
                S::labelled("credits-v2", PRINCIPAL_LABEL, &["Writer", "Writers"]),
                S::labelled("legacy-v1", LEGACY_CREDIT_LABEL, &["Writer", "Writers"]),
            ],
            Field::Star => vec![
                S::labelled("credits-v2", PRINCIPAL_LABEL, &["Star", "Stars"]),
                S::labelled("legacy-v1", LEGACY_CREDIT_LABEL, &["Star", "Stars"]),
            ],
            Field::Country => vec![
                S::labelled(
                    "details-v2",
                    details_label("title-details-origin"),
                    &["Country of origin", "Countries of origin"],
                ),
                S::labelled("legacy-v1", LEGACY_DETAIL_LABEL, &["Country"]),
            ],
            Field::Budget => vec![
                S::labelled(
                    "boxoffice-v2",
                    details_label("title-boxoffice-budget"),
                    &["Budget"],
                ),
                S::labelled("legacy-v1", LEGACY_DETAIL_LABEL, &["Budget"]),
            ],
            // Worldwide only; domestic figures are a different measure.
            Field::Gross => vec![
                S::labelled(
                    "boxoffice-v2",
                    details_label("title-boxoffice-cumulativeworldwidegross"),
                    &["Gross worldwide"],
                ),
                S::labelled("legacy-v1", LEGACY_DETAIL_LABEL, &["Cumulative Worldwide Gross"]),
            ],
            Field::Company => vec![
                S::labelled(
                    "details-v2",
                    details_label("title-details-companies"),
                    &["Production company", "Production companies"],
                ),
                S::labelled("legacy-v1", LEGACY_DETAIL_LABEL, &["Production Co"]),
            ],
            Field::Runtime => vec![
                S::labelled(
                    "techspec-v2",
                    details_label("title-techspec_runtime"),
                    &["Runtime"],
                )
                .with_strip(r"\s*\(.*\)$"),
                S::text("legacy-v1", "div.subtext > time"),
            ],
        }
    }
}
