//! In-memory record collection and table export.

use crate::models::{COLUMNS, MovieRecord};

/// Fixed-schema table of movie rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Header row; identical for every run.
    pub fn header(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> FromIterator<&'a MovieRecord> for Table {
    fn from_iter<I: IntoIterator<Item = &'a MovieRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().map(MovieRecord::to_row).collect(),
        }
    }
}

/// Append-only collection of assembled records, in arrival order.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: Vec<MovieRecord>,
    flushed: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn collect(&mut self, record: MovieRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every collected record as a table.
    pub fn export(&self) -> Table {
        self.records.iter().collect()
    }

    /// Records collected since the last [`mark_flushed`](Self::mark_flushed).
    pub fn pending(&self) -> Table {
        self.records[self.flushed..].iter().collect()
    }

    /// Record that everything collected so far has been persisted.
    pub fn mark_flushed(&mut self) {
        self.flushed = self.records.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, RawFieldMap};
    use crate::services::RecordAssembler;

    fn record(name: &str, year: i32) -> MovieRecord {
        let mut raw = RawFieldMap::new();
        raw.set(Field::Name, name);
        RecordAssembler::new().assemble(&raw, year).unwrap()
    }

    #[test]
    fn test_export_preserves_arrival_order() {
        let mut agg = Aggregator::new();
        agg.collect(record("Alien", 1979));
        agg.collect(record("Airplane!", 1980));

        let table = agg.export();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][0], "Alien");
        assert_eq!(table.rows()[1][0], "Airplane!");
        assert_eq!(table.rows()[1][3], "1980");
    }

    #[test]
    fn test_header_is_fixed() {
        assert_eq!(
            Aggregator::new().export().header().join(","),
            "name,rating,genre,year,released,score,votes,director,writer,star,country,budget,gross,company,runtime"
        );
    }

    #[test]
    fn test_pending_tracks_flushes() {
        let mut agg = Aggregator::new();
        agg.collect(record("Alien", 1979));
        assert_eq!(agg.pending().len(), 1);

        agg.mark_flushed();
        assert!(agg.pending().is_empty());

        agg.collect(record("Airplane!", 1980));
        let pending = agg.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.rows()[0][0], "Airplane!");
        assert_eq!(agg.export().len(), 2);
    }
}
