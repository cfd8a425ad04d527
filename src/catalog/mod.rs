//! Issue catalog: the release backlog keyed by canonical issue key.

use crate::domain::IssueRecord;
use std::collections::BTreeMap;

pub mod loader;

pub use loader::{load_catalog, normalize_column};

/// Read-only mapping from upper-case issue key to its tracker record.
///
/// Iteration is ordered by key so reports are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueCatalog {
    records: BTreeMap<String, IssueRecord>,
}

impl IssueCatalog {
    /// Build from records; a later record with the same key replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = IssueRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.key.clone(), r)).collect();
        Self { records }
    }

    pub fn get(&self, key: &str) -> Option<&IssueRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &IssueRecord> {
        self.records.values()
    }
}
