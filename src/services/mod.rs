//! Service layer for the crawler application.
//!
//! This module contains the extraction logic for:
//! - Listing pages (`ListingPageParser`)
//! - Detail pages (`DetailPageParser`)
//! - Raw value normalization (`normalize`)
//! - Record assembly (`RecordAssembler`)

mod assemble;
mod detail;
mod listing;
pub mod normalize;

pub use assemble::RecordAssembler;
pub use detail::DetailPageParser;
pub use listing::ListingPageParser;
pub use normalize::NormalizeError;
