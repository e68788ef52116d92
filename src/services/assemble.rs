//! Record assembly.
//!
//! Normalizes a [`RawFieldMap`] and merges it with the batch year. Values
//! that fail their grammar become nulls; nothing here fails the record.

use crate::models::{Field, MovieRecord, NOT_RATED, RawFieldMap};
use crate::services::normalize::{self, NormalizeResult};

/// Builds immutable movie records from raw field maps.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordAssembler;

impl RecordAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble a record for the batch `year`.
    ///
    /// Returns `None` only when the map carries no usable name.
    pub fn assemble(&self, raw: &RawFieldMap, year: i32) -> Option<MovieRecord> {
        let name = text(raw, Field::Name)?;

        let (rating, genre, score, votes) = Self::titlebar(raw);
        let (director, writer, star) = Self::crew(raw);
        let details = Self::details(raw);

        Some(MovieRecord {
            name,
            rating,
            genre,
            year,
            released: details.released,
            score,
            votes,
            director,
            writer,
            star,
            country: details.country,
            budget: details.budget,
            gross: details.gross,
            company: details.company,
            runtime: details.runtime,
        })
    }

    fn titlebar(raw: &RawFieldMap) -> (String, Option<String>, Option<f64>, Option<u64>) {
        (
            text(raw, Field::Rating).unwrap_or_else(|| NOT_RATED.to_string()),
            text(raw, Field::Genre),
            typed(raw, Field::Score, normalize::score),
            typed(raw, Field::Votes, normalize::votes),
        )
    }

    fn crew(raw: &RawFieldMap) -> (Option<String>, Option<String>, Option<String>) {
        (
            text(raw, Field::Director),
            text(raw, Field::Writer),
            text(raw, Field::Star),
        )
    }

    fn details(raw: &RawFieldMap) -> Details {
        Details {
            released: text(raw, Field::Released),
            country: text(raw, Field::Country),
            // Missing or unparseable budget stays null, never zero.
            budget: typed(raw, Field::Budget, normalize::currency),
            gross: typed(raw, Field::Gross, normalize::currency),
            company: text(raw, Field::Company),
            runtime: typed(raw, Field::Runtime, normalize::duration),
        }
    }
}

struct Details {
    released: Option<String>,
    country: Option<String>,
    budget: Option<f64>,
    gross: Option<f64>,
    company: Option<String>,
    runtime: Option<u32>,
}

fn text(raw: &RawFieldMap, field: Field) -> Option<String> {
    raw.get(field).and_then(normalize::text)
}

fn typed<T>(raw: &RawFieldMap, field: Field, parse: fn(&str) -> NormalizeResult<T>) -> Option<T> {
    let value = raw.get(field)?;
    parse(value)
        .inspect_err(|e| log::debug!("Dropping {field}: {e}"))
        .ok()
}
