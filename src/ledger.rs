//! Run-scoped record of which issue keys were referenced in source control.

use crate::catalog::IssueCatalog;
use crate::domain::{ExtractionMatch, MissingIssue};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct LedgerMaps {
    issue_key_to_app: HashMap<String, String>,
    issue_key_to_commit: HashMap<String, String>,
}

/// Shared key -> app / key -> commit mapping, written from concurrent repository tasks.
///
/// Both maps are updated under one lock so a key is always present in both or
/// neither. Writes are last-wins: when two applications reference the same key,
/// the owner is whichever task recorded last.
#[derive(Debug, Default)]
pub struct Ledger {
    maps: Mutex<LedgerMaps>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerMaps> {
        self.maps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, issue_key: &str, app: &str, commit_id: &str) {
        let mut maps = self.lock();
        maps.issue_key_to_app.insert(issue_key.to_string(), app.to_string());
        maps.issue_key_to_commit.insert(issue_key.to_string(), commit_id.to_string());
    }

    /// Record every match under `app`, holding the lock once for the batch.
    pub fn record_matches(&self, app: &str, matches: &[ExtractionMatch]) {
        if matches.is_empty() {
            return;
        }
        let mut maps = self.lock();
        for m in matches {
            maps.issue_key_to_app.insert(m.issue_key.clone(), app.to_string());
            maps.issue_key_to_commit.insert(m.issue_key.clone(), m.commit_id.clone());
        }
    }

    pub fn contains(&self, issue_key: &str) -> bool {
        self.lock().issue_key_to_app.contains_key(issue_key)
    }

    pub fn app_for(&self, issue_key: &str) -> Option<String> {
        self.lock().issue_key_to_app.get(issue_key).cloned()
    }

    pub fn commit_for(&self, issue_key: &str) -> Option<String> {
        self.lock().issue_key_to_commit.get(issue_key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().issue_key_to_app.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Catalog issues never recorded, in catalog key order.
    pub fn missing(&self, catalog: &IssueCatalog) -> Vec<MissingIssue> {
        let maps = self.lock();
        catalog
            .records()
            .filter(|record| !maps.issue_key_to_app.contains_key(&record.key))
            .map(MissingIssue::from)
            .collect()
    }
}
