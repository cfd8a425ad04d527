//! Commit-message issue-key extraction
//!
//! Extraction is pure: it returns the matches a commit earns and leaves
//! recording them in the [`Ledger`](crate::ledger::Ledger) to the caller.

use crate::catalog::IssueCatalog;
use crate::domain::{Commit, DateWindow, ExtractionMatch, UNKNOWN};
use crate::window::commit_moment;

pub mod keys;
pub mod normalize;

pub use keys::{scan_keys, ExclusionSet};
pub use normalize::{clean, preprocess};

/// Read-only inputs shared by every extraction in a run.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub fix_version: &'a str,
    pub catalog: &'a IssueCatalog,
    pub app_name: &'a str,
    pub window: &'a DateWindow,
    pub develop_branch: &'a str,
    pub exclusions: &'a ExclusionSet,
}

/// Extract creditable issue keys from one commit.
///
/// Commits before the cutoff are rejected; commits after the code freeze are
/// rejected only on the develop branch, since release branches legitimately
/// carry post-freeze fixes.
pub fn extract(commit: &Commit, ctx: &ExtractionContext<'_>) -> Vec<ExtractionMatch> {
    let Some(moment) = commit_moment(commit.author_timestamp_millis) else {
        tracing::debug!(
            "Skipping commit {} - unrepresentable timestamp {}",
            commit.id,
            commit.author_timestamp_millis
        );
        return Vec::new();
    };
    let branch = commit.branch.as_str();
    if ctx.window.is_before_cutoff(moment)
        || (branch == ctx.develop_branch && ctx.window.is_after_freeze(moment))
    {
        tracing::debug!("Skipping commit {} - outside date range ({})", commit.id, moment);
        return Vec::new();
    }

    tracing::debug!("Raw commit message for {}: '{}'", commit.id, commit.message);
    let cleaned = clean(&commit.message);
    let preprocessed = preprocess(&cleaned);

    let mut matches = Vec::new();
    for key in scan_keys(&preprocessed, ctx.exclusions) {
        let record = ctx.catalog.get(&key);
        if let Some(record) = record {
            if record.fix_version != ctx.fix_version {
                tracing::debug!(
                    "Skipping {} - fixVersion mismatch ({} != {})",
                    key,
                    record.fix_version,
                    ctx.fix_version
                );
                continue;
            }
        }

        matches.push(ExtractionMatch {
            commit_id: commit.id.clone(),
            cleaned_message: cleaned.clone(),
            issue_type: record.map_or_else(|| UNKNOWN.to_string(), |r| r.issue_type.clone()),
            fix_version: record.map_or_else(|| UNKNOWN.to_string(), |r| r.fix_version.clone()),
            app: record.map_or_else(|| ctx.app_name.to_string(), |r| r.app.clone()),
            source_branch: branch.to_string(),
            issue_key: key,
        });
    }

    if matches.is_empty() {
        tracing::debug!("No valid issue keys extracted from commit {}", commit.id);
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IssueRecord;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    const DAY_MS: i64 = 86_400_000;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).expect("date").and_time(NaiveTime::MIN)
    }

    fn window() -> DateWindow {
        DateWindow {
            release_date: day(2025, 2, 20),
            code_freeze_date: day(2025, 2, 1),
            cutoff_date: day(2025, 1, 1),
        }
    }

    fn millis(moment: NaiveDateTime) -> i64 {
        moment.and_utc().timestamp_millis()
    }

    fn commit(message: &str, ts: i64, branch: &str) -> Commit {
        Commit {
            id: "c0ffee".into(),
            message: message.into(),
            author_timestamp_millis: ts,
            branch: branch.into(),
            repo: "PRJ/app".into(),
        }
    }

    fn catalog() -> IssueCatalog {
        IssueCatalog::from_records(vec![
            IssueRecord {
                key: "ABC-123".into(),
                issue_type: "Bug".into(),
                fix_version: "2025.01.01".into(),
                app: "PC".into(),
                summary: "old release".into(),
                link: String::new(),
            },
            IssueRecord {
                key: "ABC-200".into(),
                issue_type: "Story".into(),
                fix_version: "2025.02.01".into(),
                app: "BC".into(),
                summary: "this release".into(),
                link: String::new(),
            },
        ])
    }

    fn run(message: &str, ts: i64, branch: &str, exclusions: &ExclusionSet) -> Vec<ExtractionMatch> {
        let catalog = catalog();
        let window = window();
        let ctx = ExtractionContext {
            fix_version: "2025.02.01",
            catalog: &catalog,
            app_name: "CC",
            window: &window,
            develop_branch: "develop",
            exclusions,
        };
        extract(&commit(message, ts, branch), &ctx)
    }

    fn mid() -> i64 {
        millis(day(2025, 1, 15))
    }

    #[test]
    fn untracked_key_uses_unknown_and_caller_app() {
        let matches =
            run("Fix XYZ-9: null pointer\n on save", mid(), "develop", &ExclusionSet::default());
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.issue_key, "XYZ-9");
        assert_eq!(m.cleaned_message, "Fix XYZ-9: null pointer on save");
        assert_eq!(m.issue_type, UNKNOWN);
        assert_eq!(m.fix_version, UNKNOWN);
        assert_eq!(m.app, "CC");
        assert_eq!(m.source_branch, "develop");
        assert_eq!(m.commit_id, "c0ffee");
    }

    #[test]
    fn tracked_key_takes_catalog_fields() {
        let matches = run("ABC-200_hotfix applied", mid(), "release", &ExclusionSet::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].issue_key, "ABC-200");
        assert_eq!(matches[0].issue_type, "Story");
        assert_eq!(matches[0].app, "BC");
        assert_eq!(matches[0].cleaned_message, "ABC-200_hotfix applied");
    }

    #[test]
    fn fix_version_mismatch_is_dropped() {
        assert!(run("ABC-123 fix", mid(), "develop", &ExclusionSet::default()).is_empty());
    }

    #[test]
    fn cutoff_boundary_is_inclusive() {
        let at_cutoff = millis(day(2025, 1, 1));
        assert_eq!(run("XYZ-1", at_cutoff, "develop", &ExclusionSet::default()).len(), 1);
        assert!(run("XYZ-1", at_cutoff - 1, "develop", &ExclusionSet::default()).is_empty());
        assert!(run("XYZ-1", at_cutoff - 1, "release", &ExclusionSet::default()).is_empty());
    }

    #[test]
    fn freeze_bound_applies_only_to_develop() {
        let after_freeze = millis(day(2025, 2, 1)) + DAY_MS;
        assert!(run("XYZ-1", after_freeze, "develop", &ExclusionSet::default()).is_empty());
        assert_eq!(run("XYZ-1", after_freeze, "release", &ExclusionSet::default()).len(), 1);
        let at_freeze = millis(day(2025, 2, 1));
        assert_eq!(run("XYZ-1", at_freeze, "develop", &ExclusionSet::default()).len(), 1);
    }

    #[test]
    fn excluded_keys_never_match_even_when_tracked() {
        let exclusions = ExclusionSet::new(&["abc"]).expect("patterns");
        assert!(run("ABC-200 and abc-5", mid(), "develop", &exclusions).is_empty());
    }

    #[test]
    fn extraction_is_repeatable() {
        let first = run("XYZ-1 ABC-200", mid(), "develop", &ExclusionSet::default());
        let second = run("XYZ-1 ABC-200", mid(), "develop", &ExclusionSet::default());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
