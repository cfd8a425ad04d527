//! Issue-key scanning, validation and exclusion rules.

use crate::error::{ReconcileError, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Lexical candidate: letters, hyphen, digits (any case).
static CANDIDATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[A-Z]+-\d+").expect("valid regex"));

/// Canonical key form, checked end to end after upper-casing.
static CANONICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+-[0-9]+$").expect("valid regex"));

/// Caller-supplied patterns that suppress keys, matched case-insensitively at
/// the start of the upper-cased key.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<Regex>,
}

impl ExclusionSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                RegexBuilder::new(&format!("^(?:{p})"))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        ReconcileError::Configuration(format!("invalid exclude pattern '{p}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, key: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(key))
    }
}

/// Whether `key` is exactly `UPPERCASE-LETTERS "-" DIGITS`.
pub fn is_canonical_key(key: &str) -> bool {
    CANONICAL.is_match(key)
}

/// Scan a preprocessed message for issue keys, left to right.
///
/// Returns upper-cased keys that survive the exclusion set and canonical-form
/// check. Repeated references are kept so each occurrence can be credited.
pub fn scan_keys(message: &str, exclusions: &ExclusionSet) -> Vec<String> {
    let mut keys = Vec::new();
    for candidate in CANDIDATE.find_iter(message) {
        let key = candidate.as_str().trim().to_uppercase();
        tracing::debug!("Matched issue key {} at index {}", key, candidate.start());

        if exclusions.is_excluded(&key) {
            tracing::debug!("Excluding {} due to matching exclude pattern", key);
            continue;
        }
        if !is_canonical_key(&key) {
            tracing::debug!("Invalid issue key format: {}", key);
            continue;
        }
        keys.push(key);
    }
    keys
}
