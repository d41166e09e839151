use std::{collections::HashSet, num::NonZeroU32};

use tracing::instrument;

use crate::domain::{RecordKey, RequirementRecord};

/// The canonical, ordered sequence of requirement records.
///
/// This is the single source of truth for record content. Views are derived
/// from it and rebuilt whenever it changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<RequirementRecord>,
}

impl Dataset {
    /// Creates a dataset holding the given records in order.
    #[must_use]
    pub const fn new(records: Vec<RequirementRecord>) -> Self {
        Self { records }
    }

    /// Replaces the entire sequence, discarding any prior records and order.
    #[instrument(level = "debug", skip_all, fields(count = records.len()))]
    pub fn ingest(&mut self, records: Vec<RequirementRecord>) {
        self.records = records;
    }

    /// Removes the first record whose text and page match.
    ///
    /// A miss leaves the dataset untouched and returns `None`.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, text: &str, page: NonZeroU32) -> Option<RequirementRecord> {
        let Some(position) = self.records.iter().position(|r| r.matches(text, page)) else {
            tracing::debug!("no record to remove");
            return None;
        };
        Some(self.records.remove(position))
    }

    /// The live ordered sequence.
    #[must_use]
    pub fn current(&self) -> &[RequirementRecord] {
        &self.records
    }

    /// Mutable access for in-place reordering.
    pub(crate) fn records_mut(&mut self) -> &mut [RequirementRecord] {
        &mut self.records
    }

    /// Looks up the first record with the given identity.
    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<&RequirementRecord> {
        self.records.iter().find(|r| r.matches(&key.text, key.page))
    }

    /// Returns `true` if a record with the given identity exists.
    #[must_use]
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.get(key).is_some()
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The identity of the first record that repeats an earlier one.
    #[must_use]
    pub fn find_duplicate(records: &[RequirementRecord]) -> Option<RecordKey> {
        let mut seen = HashSet::with_capacity(records.len());
        records
            .iter()
            .find(|r| !seen.insert((r.text.as_str(), r.page)))
            .map(RequirementRecord::key)
    }
}

impl From<Vec<RequirementRecord>> for Dataset {
    fn from(records: Vec<RequirementRecord>) -> Self {
        Self::new(records)
    }
}
