//! Movie record and the raw field map it is assembled from.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder certification for movies without a detected rating.
pub const NOT_RATED: &str = "Not Rated";

/// Persisted column order of the exported table.
pub const COLUMNS: [&str; 15] = [
    "name", "rating", "genre", "year", "released", "score", "votes", "director", "writer", "star",
    "country", "budget", "gross", "company", "runtime",
];

/// A field resolved from a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Rating,
    Genre,
    Released,
    Score,
    Votes,
    Director,
    Writer,
    Star,
    Country,
    Budget,
    Gross,
    Company,
    Runtime,
}

impl Field {
    /// Every page-derived field, in column order.
    pub const ALL: [Field; 14] = [
        Field::Name,
        Field::Rating,
        Field::Genre,
        Field::Released,
        Field::Score,
        Field::Votes,
        Field::Director,
        Field::Writer,
        Field::Star,
        Field::Country,
        Field::Budget,
        Field::Gross,
        Field::Company,
        Field::Runtime,
    ];

    /// Title bar group.
    pub const TITLEBAR: [Field; 5] = [
        Field::Name,
        Field::Rating,
        Field::Genre,
        Field::Score,
        Field::Votes,
    ];

    /// Principal credits group.
    pub const CREW: [Field; 3] = [Field::Director, Field::Writer, Field::Star];

    /// Details and box office group.
    pub const DETAILS: [Field; 6] = [
        Field::Released,
        Field::Country,
        Field::Budget,
        Field::Gross,
        Field::Company,
        Field::Runtime,
    ];

    /// Stable key used in config files, logs and the table header.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Rating => "rating",
            Field::Genre => "genre",
            Field::Released => "released",
            Field::Score => "score",
            Field::Votes => "votes",
            Field::Director => "director",
            Field::Writer => "writer",
            Field::Star => "star",
            Field::Country => "country",
            Field::Budget => "budget",
            Field::Gross => "gross",
            Field::Company => "company",
            Field::Runtime => "runtime",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

/// Raw, unnormalized strings extracted from one detail page.
///
/// Built once per page and consumed by the assembler; absent keys are nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFieldMap {
    values: HashMap<Field, String>,
}

impl RawFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value. Blank values are treated as missing.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Number of resolved fields.
    pub fn resolved(&self) -> usize {
        self.values.len()
    }

    /// Fields whose strategy chains came up empty.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.values.contains_key(f))
            .collect()
    }
}

/// A fully assembled movie. Immutable once built by the assembler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    pub(crate) name: String,
    pub(crate) rating: String,
    pub(crate) genre: Option<String>,
    pub(crate) year: i32,
    pub(crate) released: Option<String>,
    pub(crate) score: Option<f64>,
    pub(crate) votes: Option<u64>,
    pub(crate) director: Option<String>,
    pub(crate) writer: Option<String>,
    pub(crate) star: Option<String>,
    pub(crate) country: Option<String>,
    pub(crate) budget: Option<f64>,
    pub(crate) gross: Option<f64>,
    pub(crate) company: Option<String>,
    pub(crate) runtime: Option<u32>,
}

impl MovieRecord {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn rating(&self) -> &str {
        &self.rating
    }
    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }
    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn released(&self) -> Option<&str> {
        self.released.as_deref()
    }
    pub fn score(&self) -> Option<f64> {
        self.score
    }
    pub fn votes(&self) -> Option<u64> {
        self.votes
    }
    pub fn director(&self) -> Option<&str> {
        self.director.as_deref()
    }
    pub fn writer(&self) -> Option<&str> {
        self.writer.as_deref()
    }
    pub fn star(&self) -> Option<&str> {
        self.star.as_deref()
    }
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
    pub fn budget(&self) -> Option<f64> {
        self.budget
    }
    pub fn gross(&self) -> Option<f64> {
        self.gross
    }
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }
    pub fn runtime(&self) -> Option<u32> {
        self.runtime
    }

    /// Render the record as table cells in [`COLUMNS`] order.
    ///
    /// Nulls become empty cells.
    pub fn to_row(&self) -> Vec<String> {
        fn cell<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        vec![
            self.name.clone(),
            self.rating.clone(),
            cell(self.genre()),
            self.year.to_string(),
            cell(self.released()),
            cell(self.score),
            cell(self.votes),
            cell(self.director()),
            cell(self.writer()),
            cell(self.star()),
            cell(self.country()),
            cell(self.budget),
            cell(self.gross),
            cell(self.company()),
            cell(self.runtime),
        ]
    }
}
