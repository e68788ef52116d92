//! Field normalizers.
//!
//! Each function accepts one small grammar and rejects everything else with a
//! named [`NormalizeError`]. Callers turn rejections into nulls.
//!
//! | kind     | accepted                                   | example             |
//! |----------|--------------------------------------------|---------------------|
//! | currency | `$` amount, `,` groups, optional `(note)`  | `$12,345 (estimated)` |
//! | duration | `<H>h <M>min`, `<H>h`, `<M>min`, `<M>`     | `2h 15min`          |
//! | votes    | integer with `,` groups, or decimal + `K`/`M` | `1.2K`           |
//! | score    | decimal in `[0, 10]`, optional `/10`       | `7.4/10`            |

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Why a raw string was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no currency marker in '{0}'")]
    MissingCurrencyMarker(String),

    #[error("malformed amount '{0}'")]
    InvalidAmount(String),

    #[error("malformed duration '{0}'")]
    InvalidDuration(String),

    #[error("malformed vote count '{0}'")]
    InvalidVoteCount(String),

    #[error("malformed score '{0}'")]
    InvalidScore(String),

    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

pub type NormalizeResult<T> = std::result::Result<T, NormalizeError>;

/// Recognized currency markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyMarker {
    Dollar,
}

impl CurrencyMarker {
    const ALL: [CurrencyMarker; 1] = [CurrencyMarker::Dollar];

    fn symbol(self) -> &'static str {
        match self {
            CurrencyMarker::Dollar => "$",
        }
    }
}

/// Magnitude suffixes on abbreviated vote counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    Thousand,
    Million,
}

impl Magnitude {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "K" => Some(Magnitude::Thousand),
            "M" => Some(Magnitude::Million),
            _ => None,
        }
    }

    fn multiplier(self) -> f64 {
        match self {
            Magnitude::Thousand => 1_000.0,
            Magnitude::Million => 1_000_000.0,
        }
    }
}

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?(?:\s*\([^)]*\))?$").expect("valid regex")
});

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)\s*h)?\s*(?:(\d+)\s*min)?$").expect("valid regex")
});

static VOTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d{1,3}(?:,\d{3})+|\d+)|(\d+(?:\.\d+)?)([KM]))$").expect("valid regex")
});

static SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}(?:\.\d+)?)(?:\s*/\s*10)?$").expect("valid regex"));

/// Parse a money amount such as `$12,345` into a non-negative float.
pub fn currency(raw: &str) -> NormalizeResult<f64> {
    let trimmed = raw.trim();
    let rest = CurrencyMarker::ALL
        .into_iter()
        .find_map(|marker| trimmed.strip_prefix(marker.symbol()))
        .ok_or_else(|| NormalizeError::MissingCurrencyMarker(raw.to_string()))?
        .trim_start();

    let caps = AMOUNT
        .captures(rest)
        .ok_or_else(|| NormalizeError::InvalidAmount(raw.to_string()))?;
    let digits = caps[1].replace(',', "");
    let fraction = caps.get(2).map_or("", |m| m.as_str());

    format!("{digits}{fraction}")
        .parse::<f64>()
        .map_err(|_| NormalizeError::InvalidAmount(raw.to_string()))
}

/// Parse `2h 15min`, `3h`, `95min` or a bare minute count into minutes.
pub fn duration(raw: &str) -> NormalizeResult<u32> {
    let trimmed = raw.trim();
    let invalid = || NormalizeError::InvalidDuration(raw.to_string());

    let minutes = if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        trimmed.parse::<u32>().map_err(|_| invalid())?
    } else {
        let caps = DURATION.captures(trimmed).ok_or_else(invalid)?;
        let hours = caps.get(1);
        let mins = caps.get(2);
        if hours.is_none() && mins.is_none() {
            return Err(invalid());
        }
        let hours: u32 = hours.map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| invalid())?;
        let mins: u32 = mins.map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| invalid())?;
        hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(mins))
            .ok_or_else(invalid)?
    };

    if minutes == 0 {
        return Err(NormalizeError::OutOfRange(raw.to_string()));
    }
    Ok(minutes)
}

/// Parse `500`, `1,234`, `1.2K` or `3.4M` into a vote count.
pub fn votes(raw: &str) -> NormalizeResult<u64> {
    let trimmed = raw.trim();
    let invalid = || NormalizeError::InvalidVoteCount(raw.to_string());
    let caps = VOTES.captures(trimmed).ok_or_else(invalid)?;

    if let Some(plain) = caps.get(1) {
        return plain.as_str().replace(',', "").parse().map_err(|_| invalid());
    }

    let value: f64 = caps[2].parse().map_err(|_| invalid())?;
    let magnitude = Magnitude::from_suffix(&caps[3]).ok_or_else(invalid)?;
    let scaled = (value * magnitude.multiplier()).round();
    if !scaled.is_finite() || scaled > u64::MAX as f64 {
        return Err(NormalizeError::OutOfRange(raw.to_string()));
    }
    Ok(scaled as u64)
}

/// Parse a user score such as `7.4` or `7.4/10`.
pub fn score(raw: &str) -> NormalizeResult<f64> {
    let caps = SCORE
        .captures(raw.trim())
        .ok_or_else(|| NormalizeError::InvalidScore(raw.to_string()))?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|_| NormalizeError::InvalidScore(raw.to_string()))?;
    if !(0.0..=10.0).contains(&value) {
        return Err(NormalizeError::OutOfRange(raw.to_string()));
    }
    Ok(value)
}

/// Collapse whitespace; blank text is null.
pub fn text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
