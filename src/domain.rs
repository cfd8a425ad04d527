//! Core data types shared across fetching, extraction and reporting.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Value used for catalog fields when an extracted key is not tracked.
pub const UNKNOWN: &str = "Unknown";

/// Marker written into every missing-issue row.
pub const MISSING_FROM_GIT: &str = "Git";

pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A commit as returned by the commit source, already scoped to one repo/branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub author_timestamp_millis: i64,
    pub branch: String,
    pub repo: String,
}

/// One tracked issue from the release backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    #[serde(rename = "Issue Key")]
    pub key: String,
    #[serde(rename = "Issue Type")]
    pub issue_type: String,
    #[serde(rename = "Fix Version")]
    pub fix_version: String,
    #[serde(rename = "App")]
    pub app: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Link")]
    pub link: String,
}

/// A single issue key credited to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMatch {
    #[serde(rename = "Issue Key")]
    pub issue_key: String,
    #[serde(rename = "Commit Hash")]
    pub commit_id: String,
    #[serde(rename = "Message")]
    pub cleaned_message: String,
    #[serde(rename = "Issue Type")]
    pub issue_type: String,
    #[serde(rename = "App")]
    pub app: String,
    #[serde(rename = "FixVersion")]
    pub fix_version: String,
    #[serde(rename = "Commit Source")]
    pub source_branch: String,
}

/// Release, code-freeze and cutoff boundaries for one run.
///
/// Always satisfies `cutoff_date <= code_freeze_date <= release_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub release_date: NaiveDateTime,
    pub code_freeze_date: NaiveDateTime,
    pub cutoff_date: NaiveDateTime,
}

impl DateWindow {
    pub fn is_before_cutoff(&self, moment: NaiveDateTime) -> bool {
        moment < self.cutoff_date
    }

    pub fn is_after_freeze(&self, moment: NaiveDateTime) -> bool {
        moment > self.code_freeze_date
    }

    /// Inclusive on both ends.
    pub fn contains(&self, moment: NaiveDateTime) -> bool {
        !self.is_before_cutoff(moment) && !self.is_after_freeze(moment)
    }
}

/// A tracked issue with no referencing commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingIssue {
    #[serde(flatten)]
    pub record: IssueRecord,
    #[serde(rename = "Missing From")]
    pub missing_from: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

impl From<&IssueRecord> for MissingIssue {
    fn from(record: &IssueRecord) -> Self {
        Self {
            record: record.clone(),
            missing_from: MISSING_FROM_GIT.to_string(),
            notes: String::new(),
        }
    }
}

/// A commit inside the window that referenced no creditable issue key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanCommit {
    #[serde(rename = "App")]
    pub app: String,
    #[serde(rename = "Repository")]
    pub repo: String,
    #[serde(rename = "Commit Hash")]
    pub commit_id: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Commit Source")]
    pub branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoStatus {
    Ok,
    Failed,
}

/// Per-repository summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOutcome {
    pub repo: String,
    pub app: String,
    pub status: RepoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub commits_seen: usize,
    pub matches: usize,
    pub orphans: usize,
}

/// Everything the run hands to the report writer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub matches: BTreeMap<String, Vec<ExtractionMatch>>,
    pub missing: Vec<MissingIssue>,
    pub orphans: BTreeMap<String, Vec<OrphanCommit>>,
    pub repos: Vec<RepoOutcome>,
}

impl ReconcileReport {
    pub fn total_matches(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    pub fn total_orphans(&self) -> usize {
        self.orphans.values().map(Vec::len).sum()
    }
}

/// Fully merged run configuration (defaults < file < environment < CLI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `PROJECT/REPO` -> application name.
    pub repos: BTreeMap<String, String>,
    pub develop_branch: String,
    pub release_branch: String,
    pub develop_only: bool,
    pub fix_version: String,
    pub release_prefix: String,
    pub bitbucket_base_url: String,
    pub commit_fetch_limit: u32,
    pub cutoff_days_before_code_freeze: u32,
    pub code_freeze_days_before_release: u32,
    pub exclude_patterns: Vec<String>,
    pub max_workers: usize,
    pub output_dir: PathBuf,
    pub tracker_base_url: Option<String>,
    pub link_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos: BTreeMap::new(),
            develop_branch: "develop".to_string(),
            release_branch: "release".to_string(),
            develop_only: false,
            fix_version: String::new(),
            release_prefix: "Mobilitas ".to_string(),
            bitbucket_base_url: "https://bitbucket.example.com/rest/api/1.0".to_string(),
            commit_fetch_limit: 25,
            cutoff_days_before_code_freeze: 28,
            code_freeze_days_before_release: 17,
            exclude_patterns: Vec::new(),
            max_workers: 4,
            output_dir: PathBuf::from("."),
            tracker_base_url: None,
            link_base_url: "https://jira.example.com/browse".to_string(),
        }
    }
}

impl Config {
    /// Branches each repository task walks, develop first.
    pub fn branches(&self) -> Vec<String> {
        if self.develop_only {
            vec![self.develop_branch.clone()]
        } else {
            vec![self.develop_branch.clone(), self.release_branch.clone()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(0, 0, 0)).expect("date")
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = DateWindow {
            release_date: at(2025, 4, 18),
            code_freeze_date: at(2025, 4, 1),
            cutoff_date: at(2025, 3, 4),
        };
        assert!(window.contains(at(2025, 3, 4)));
        assert!(window.contains(at(2025, 4, 1)));
        assert!(!window.contains(at(2025, 3, 3)));
        assert!(!window.contains(at(2025, 4, 2)));
    }

    #[test]
    fn develop_only_limits_branches() {
        let mut cfg = Config::default();
        assert_eq!(cfg.branches(), vec!["develop", "release"]);
        cfg.develop_only = true;
        assert_eq!(cfg.branches(), vec!["develop"]);
    }

    #[test]
    fn missing_issue_serializes_flat_with_marker() {
        let record = IssueRecord {
            key: "ABC-1".into(),
            issue_type: "Story".into(),
            fix_version: "Mobilitas 2025.04.18".into(),
            app: "PC".into(),
            summary: "Do the thing".into(),
            link: "https://jira.example.com/browse/ABC-1".into(),
        };
        let value = serde_json::to_value(MissingIssue::from(&record)).expect("json");
        assert_eq!(value["Issue Key"], "ABC-1");
        assert_eq!(value["Missing From"], "Git");
        assert_eq!(value["Notes"], "");
    }
}
