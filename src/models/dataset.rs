//! Consolidated record collection

use serde::Serialize;

use super::record::NormalizedRecord;

/// Records for a whole extraction range, in month then page order
///
/// No deduplication happens: an entry the API returns twice appears twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConsolidatedDataset {
    records: Vec<NormalizedRecord>,
}

impl ConsolidatedDataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from records already in order
    pub fn from_records(records: Vec<NormalizedRecord>) -> Self {
        Self { records }
    }

    /// Append one month's records after everything already collected
    pub(crate) fn append_month(&mut self, records: Vec<NormalizedRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConsolidatedDataset {
    type Item = &'a NormalizedRecord;
    type IntoIter = std::slice::Iter<'a, NormalizedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
