use crate::models::Row;
use std::collections::{BTreeSet, HashMap};

/// Rows of each worksheet fetched so far, keyed by worksheet title.
///
/// A title maps to `Some(rows)` once loaded and to `None` once tombstoned by a
/// delete. Titles that were never loaded have no entry at all. Owned by a single
/// client; there is no internal locking.
#[derive(Debug, Default)]
pub struct WorksheetCache {
    entries: HashMap<String, Option<Vec<Row>>>,
}

impl WorksheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, title: &str) -> Option<&[Row]> {
        self.entries.get(title).and_then(|rows| rows.as_deref())
    }

    pub fn put(&mut self, title: impl Into<String>, rows: Vec<Row>) {
        self.entries.insert(title.into(), Some(rows));
    }

    pub fn tombstone(&mut self, title: impl Into<String>) {
        self.entries.insert(title.into(), None);
    }

    /// Drop loaded titles that `keep` rejects. Tombstones are left alone.
    pub fn retain_loaded(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries
            .retain(|title, rows| rows.is_none() || keep(title.as_str()));
    }

    pub fn is_loaded(&self, title: &str) -> bool {
        self.get(title).is_some()
    }

    pub fn is_tombstoned(&self, title: &str) -> bool {
        matches!(self.entries.get(title), Some(None))
    }

    /// Titles with loaded rows; tombstoned titles are left out.
    pub fn titles(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|(_, rows)| rows.is_some())
            .map(|(title, _)| title.clone())
            .collect()
    }

    pub fn loaded(&self) -> impl Iterator<Item = (&str, &[Row])> {
        self.entries
            .iter()
            .filter_map(|(title, rows)| rows.as_deref().map(|rows| (title.as_str(), rows)))
    }
}
