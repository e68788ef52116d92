//! Detail page field extraction.
//!
//! Every field is resolved by walking its strategy chain and keeping the
//! first usable value. Only the title is mandatory.

use std::collections::BTreeMap;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{AppError, Result};
use crate::models::{Extraction, Field, RawFieldMap, SelectorStrategy, StrategyTable};

/// A [`SelectorStrategy`] with its selector and strip pattern compiled.
#[derive(Debug)]
struct CompiledStrategy {
    tag: String,
    selector: Selector,
    labels: Vec<String>,
    extract: Extraction,
    strip: Option<Regex>,
    reject: Vec<String>,
}

impl CompiledStrategy {
    fn compile(strategy: &SelectorStrategy) -> Result<Self> {
        let selector = Selector::parse(&strategy.selector)
            .map_err(|e| AppError::selector(&strategy.selector, format!("{e:?}")))?;
        let strip = strategy
            .strip
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| {
                AppError::config(format!("Invalid strip pattern in '{}': {e}", strategy.tag))
            })?;

        Ok(Self {
            tag: strategy.tag.clone(),
            selector,
            labels: strategy.labels.iter().map(|l| label_key(l)).collect(),
            extract: strategy.extract.clone(),
            strip,
            reject: strategy.reject.iter().map(|r| r.to_lowercase()).collect(),
        })
    }

    /// Apply this strategy to a document.
    fn resolve(&self, document: &Html) -> Option<String> {
        let element = document
            .select(&self.selector)
            .find(|el| self.labels.is_empty() || self.labels.contains(&label_key(&element_text(*el))))?;

        let raw = match &self.extract {
            Extraction::Text => element_text(element),
            Extraction::Attr { name } => element.value().attr(name)?.to_string(),
            Extraction::NextSibling => next_sibling_text(element)?,
        };

        let value = match &self.strip {
            Some(pattern) => pattern.replace_all(&raw, "").into_owned(),
            None => raw,
        };
        let value = collapse(&value);

        if value.is_empty() || self.reject.contains(&value.to_lowercase()) {
            return None;
        }
        Some(value)
    }
}

/// Resolves raw field strings from a parsed detail page.
#[derive(Debug)]
pub struct DetailPageParser {
    chains: BTreeMap<Field, Vec<CompiledStrategy>>,
}

impl DetailPageParser {
    /// Compile every chain up front so bad selectors fail at startup.
    pub fn new(strategies: &StrategyTable) -> Result<Self> {
        let chains = strategies
            .iter()
            .map(|(field, chain)| {
                let compiled = chain
                    .iter()
                    .map(CompiledStrategy::compile)
                    .collect::<Result<Vec<_>>>()?;
                Ok((*field, compiled))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self { chains })
    }

    /// Extract every field. Fails only when the title cannot be found.
    pub fn extract_fields(&self, document: &Html) -> Result<RawFieldMap> {
        let mut raw = RawFieldMap::new();

        for field in Field::ALL {
            if let Some((tag, value)) = self.resolve(field, document) {
                log::debug!("{field} resolved by '{tag}': {value}");
                raw.set(field, value);
            }
        }

        if raw.get(Field::Name).is_none() {
            return Err(AppError::parse(
                "detail page",
                "mandatory title element not found",
            ));
        }

        let missing = raw.missing();
        if !missing.is_empty() {
            log::debug!(
                "Resolved {} of {} fields; missing: {:?}",
                raw.resolved(),
                Field::ALL.len(),
                missing
            );
        }
        Ok(raw)
    }

    /// Resolve one field, returning the winning strategy's tag with the value.
    pub fn resolve(&self, field: Field, document: &Html) -> Option<(&str, String)> {
        self.chains.get(&field)?.iter().find_map(|strategy| {
            strategy
                .resolve(document)
                .map(|value| (strategy.tag.as_str(), value))
        })
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse(&element.text().collect::<String>())
}

/// Label comparison key: case-insensitive, trailing colon ignored.
fn label_key(text: &str) -> String {
    collapse(text).trim_end_matches(':').trim_end().to_lowercase()
}

fn first_text(element: ElementRef<'_>) -> Option<String> {
    element
        .text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// First non-empty text following `element` among its siblings.
fn next_sibling_text(element: ElementRef<'_>) -> Option<String> {
    element.next_siblings().find_map(|node| match node.value() {
        Node::Text(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Node::Element(_) => ElementRef::wrap(node).and_then(first_text),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_strategies;

    const MODERN_PAGE: &str = r#"
        <html><body>
        <h1 data-testid="hero__pageTitle"><span class="hero__primary-text">The Shining</span></h1>
        <ul data-testid="hero-title-block__metadata">
            <li><a href="/title/tt0081505/releaseinfo">1980</a></li>
            <li><a href="/title/tt0081505/parentalguide/certificates">R</a></li>
            <li>2h 26m</li>
        </ul>
        <div data-testid="interests"><a class="ipc-chip"><span>Drama</span></a><a class="ipc-chip"><span>Horror</span></a></div>
        <div data-testid="hero-rating-bar__aggregate-rating__score"><span>8.4</span><span>/10</span></div>
        <div></div><div>1.1M</div>
        <ul>
            <li data-testid="title-pc-principal-credit"><span class="ipc-metadata-list-item__label">Director</span><div><ul><li><a>Stanley Kubrick</a></li></ul></div></li>
            <li data-testid="title-pc-principal-credit"><a class="ipc-metadata-list-item__label" href="/fullcredits/writer">Writers</a><div><ul><li><a>Stephen King</a></li><li><a>Stanley Kubrick</a></li></ul></div></li>
            <li data-testid="title-pc-principal-credit"><a class="ipc-metadata-list-item__label">Stars</a><div><ul><li><a>Jack Nicholson</a></li></ul></div></li>
        </ul>
        <ul>
            <li data-testid="title-details-releasedate"><a class="ipc-metadata-list-item__label">Release date</a><div><a>June 13, 1980 (United States)</a></div></li>
            <li data-testid="title-details-origin"><span class="ipc-metadata-list-item__label">Countries of origin</span><div><a>United Kingdom</a><a>United States</a></div></li>
            <li data-testid="title-details-companies"><a class="ipc-metadata-list-item__label">Production companies</a><div><a>Warner Bros.</a></div></li>
            <li data-testid="title-boxoffice-budget"><span class="ipc-metadata-list-item__label">Budget</span><div><span>$19,000,000 (estimated)</span></div></li>
            <li data-testid="title-boxoffice-cumulativeworldwidegross"><span class="ipc-metadata-list-item__label">Gross worldwide</span><div><span>$47,335,804</span></div></li>
            <li data-testid="title-techspec_runtime"><span class="ipc-metadata-list-item__label">Runtime</span><div>2h 26min (146 min)</div></li>
        </ul>
        </body></html>
    "#;

    const LEGACY_PAGE: &str = r#"
        <html><head><meta itemprop="contentRating" content="PG"></head><body>
        <div class="title_wrapper"><h1>The Empire Strikes Back&nbsp;(1980)</h1></div>
        <div class="subtext"><time>2h 4min</time> | <a href="/search/title?genres=action">Action</a></div>
        <span itemprop="ratingValue">8.7</span><span itemprop="ratingCount">1,234,567</span>
        <div class="credit_summary_item"><h4 class="inline">Director:</h4> <a>Irvin Kershner</a></div>
        <div class="credit_summary_item"><h4 class="inline">Writers:</h4> <a>Leigh Brackett</a>, <a>Lawrence Kasdan</a></div>
        <div class="credit_summary_item"><h4 class="inline">Stars:</h4> <a>Mark Hamill</a></div>
        <div class="txt-block"><h4 class="inline">Country:</h4> <a>USA</a></div>
        <div class="txt-block"><h4 class="inline">Budget:</h4>$18,000,000 <span>(estimated)</span></div>
        <div class="txt-block"><h4 class="inline">Production Co:</h4> <a>Lucasfilm</a></div>
        </body></html>
    "#;

    fn parser() -> DetailPageParser {
        DetailPageParser::new(&default_strategies()).unwrap()
    }

    #[test]
    fn test_modern_page_resolves_all_fields() {
        let raw = parser()
            .extract_fields(&Html::parse_document(MODERN_PAGE))
            .unwrap();

        assert_eq!(raw.get(Field::Name), Some("The Shining"));
        assert_eq!(raw.get(Field::Rating), Some("R"));
        assert_eq!(raw.get(Field::Genre), Some("Drama"));
        assert_eq!(raw.get(Field::Score), Some("8.4"));
        assert_eq!(raw.get(Field::Votes), Some("1.1M"));
        assert_eq!(raw.get(Field::Director), Some("Stanley Kubrick"));
        assert_eq!(raw.get(Field::Writer), Some("Stephen King"));
        assert_eq!(raw.get(Field::Star), Some("Jack Nicholson"));
        assert_eq!(raw.get(Field::Released), Some("June 13, 1980 (United States)"));
        assert_eq!(raw.get(Field::Country), Some("United Kingdom"));
        assert_eq!(raw.get(Field::Company), Some("Warner Bros."));
        assert_eq!(raw.get(Field::Budget), Some("$19,000,000 (estimated)"));
        assert_eq!(raw.get(Field::Gross), Some("$47,335,804"));
        assert_eq!(raw.get(Field::Runtime), Some("2h 26min"));
        assert!(raw.missing().is_empty());
    }

    #[test]
    fn test_legacy_page_falls_back() {
        let parser = parser();
        let document = Html::parse_document(LEGACY_PAGE);
        let raw = parser.extract_fields(&document).unwrap();

        assert_eq!(raw.get(Field::Name), Some("The Empire Strikes Back"));
        assert_eq!(raw.get(Field::Rating), Some("PG"));
        assert_eq!(raw.get(Field::Genre), Some("Action"));
        assert_eq!(raw.get(Field::Votes), Some("1,234,567"));
        assert_eq!(raw.get(Field::Director), Some("Irvin Kershner"));
        assert_eq!(raw.get(Field::Writer), Some("Leigh Brackett"));
        assert_eq!(raw.get(Field::Country), Some("USA"));
        assert_eq!(raw.get(Field::Budget), Some("$18,000,000"));
        assert_eq!(raw.get(Field::Company), Some("Lucasfilm"));
        assert_eq!(raw.get(Field::Runtime), Some("2h 4min"));
        assert_eq!(raw.get(Field::Gross), None);
        assert_eq!(raw.get(Field::Released), None);

        let (tag, _) = parser.resolve(Field::Name, &document).unwrap();
        assert_eq!(tag, "legacy-v1");
    }

    #[test]
    fn test_singular_country_label() {
        let html = r#"
            <h1 data-testid="hero-title-block__title">Alien</h1>
            <ul><li data-testid="title-details-origin"><span class="ipc-metadata-list-item__label">Country of origin</span><div><a>United States</a></div></li></ul>
        "#;
        let raw = parser().extract_fields(&Html::parse_document(html)).unwrap();
        assert_eq!(raw.get(Field::Name), Some("Alien"));
        assert_eq!(raw.get(Field::Country), Some("United States"));
    }

    #[test]
    fn test_single_writer_resolved_by_byline() {
        let html = r#"
            <h1 data-testid="hero-title-block__title">Alien</h1>
            <ul>
            <li data-testid="title-pc-principal-credit"><span class="ipc-metadata-list-item__label">Director</span><div><a>Ridley Scott</a></div></li>
            <li data-testid="title-pc-principal-credit"><span class="ipc-metadata-list-item__label">Writer</span><div><a>Dan O'Bannon</a></div></li>
            </ul>
        "#;
        let parser = parser();
        let document = Html::parse_document(html);
        let (tag, writer) = parser.resolve(Field::Writer, &document).unwrap();
        assert_eq!(tag, "byline-v2");
        assert_eq!(writer, "Dan O'Bannon");
    }

    #[test]
    fn test_plural_writer_marker_triggers_secondary_lookup() {
        let parser = parser();
        let document = Html::parse_document(MODERN_PAGE);
        let (tag, writer) = parser.resolve(Field::Writer, &document).unwrap();
        assert_eq!(tag, "credits-v2");
        assert_eq!(writer, "Stephen King");
    }

    #[test]
    fn test_uncredited_writer_stays_null() {
        let anchor_labels = r#"
            <h1 data-testid="hero-title-block__title">Koyaanisqatsi</h1>
            <ul>
            <li data-testid="title-pc-principal-credit"><a class="ipc-metadata-list-item__label">Director</a><div><a>Godfrey Reggio</a></div></li>
            <li data-testid="title-pc-principal-credit"><a class="ipc-metadata-list-item__label">Stars</a><div><a>John Roe</a></div></li>
            </ul>
        "#;
        let span_labels = anchor_labels.replace("<a class", "<span class").replace(
            "</a><div>",
            "</span><div>",
        );

        let parser = parser();
        for html in [anchor_labels.to_string(), span_labels] {
            let document = Html::parse_document(&html);
            assert_eq!(parser.resolve(Field::Writer, &document), None);
            let (_, star) = parser.resolve(Field::Star, &document).unwrap();
            assert_eq!(star, "John Roe");
        }
    }

    #[test]
    fn test_legacy_gross_prefers_worldwide() {
        let html = r#"
            <div class="title_wrapper"><h1>Airplane!&nbsp;(1980)</h1></div>
            <div class="txt-block"><h4 class="inline">Gross USA:</h4> $83,453,539</div>
            <div class="txt-block"><h4 class="inline">Cumulative Worldwide Gross:</h4> $171,000,000</div>
        "#;
        let raw = parser().extract_fields(&Html::parse_document(html)).unwrap();
        assert_eq!(raw.get(Field::Gross), Some("$171,000,000"));
    }

    #[test]
    fn test_legacy_domestic_gross_alone_is_null() {
        let html = r#"
            <div class="title_wrapper"><h1>Airplane!&nbsp;(1980)</h1></div>
            <div class="txt-block"><h4 class="inline">Gross USA:</h4> $83,453,539</div>
        "#;
        let raw = parser().extract_fields(&Html::parse_document(html)).unwrap();
        assert_eq!(raw.get(Field::Gross), None);
    }

    #[test]
    fn test_missing_title_is_parse_error() {
        let html = r#"<div class="subtext"><time>95min</time></div>"#;
        let err = parser()
            .extract_fields(&Html::parse_document(html))
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_unresolved_fields_are_missing_not_errors() {
        let html = r#"<h1 data-testid="hero-title-block__title">Untitled</h1>"#;
        let raw = parser().extract_fields(&Html::parse_document(html)).unwrap();
        assert_eq!(raw.resolved(), 1);
        assert_eq!(raw.get(Field::Rating), None);
    }

    #[test]
    fn test_invalid_selector_rejected_at_construction() {
        let mut table = StrategyTable::new();
        table.insert(Field::Name, vec![SelectorStrategy::text("broken", "[[invalid")]);
        assert!(matches!(
            DetailPageParser::new(&table),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn test_invalid_strip_pattern_rejected() {
        let mut table = StrategyTable::new();
        table.insert(
            Field::Name,
            vec![SelectorStrategy::text("broken", "h1").with_strip("(")],
        );
        assert!(matches!(
            DetailPageParser::new(&table),
            Err(AppError::Config(_))
        ));
    }
}
