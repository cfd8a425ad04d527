//! Run orchestration: one pooled task per repository, branches walked in order.

use crate::catalog::IssueCatalog;
use crate::domain::{
    DateWindow, ExtractionMatch, OrphanCommit, ReconcileReport, RepoOutcome, RepoStatus,
};
use crate::error::{ReconcileError, Result};
use crate::extract::{clean, extract, ExclusionSet, ExtractionContext};
use crate::fetch::{CommitSource, RepoSpec};
use crate::ledger::Ledger;
use rayon::prelude::*;
use std::collections::BTreeMap;

pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Inputs for one reconciliation pass. Everything here is read-only shared data.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileJob<'a> {
    /// `PROJECT/REPO` -> application name.
    pub repos: &'a BTreeMap<String, String>,
    pub branches: &'a [String],
    pub develop_branch: &'a str,
    pub fix_version: &'a str,
    pub catalog: &'a IssueCatalog,
    pub window: &'a DateWindow,
    pub exclusions: &'a ExclusionSet,
    pub max_workers: usize,
}

#[derive(Debug, Default)]
struct RepoTally {
    matches: Vec<ExtractionMatch>,
    orphans: Vec<OrphanCommit>,
    commits_seen: usize,
}

/// Fetch, extract and reconcile every configured repository.
///
/// A malformed repository name aborts the run before any request is made.
/// Any other failure inside a repository task is logged and that repository
/// contributes nothing; sibling tasks are unaffected.
pub fn reconcile(source: &dyn CommitSource, job: &ReconcileJob<'_>) -> Result<ReconcileReport> {
    if job.repos.is_empty() {
        return Err(ReconcileError::Configuration("no repositories configured".into()));
    }
    for repo in job.repos.keys() {
        RepoSpec::parse(repo)?;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(job.max_workers.max(1))
        .thread_name(|i| format!("gitxjira-worker-{i}"))
        .build()
        .map_err(|e| ReconcileError::Configuration(format!("failed to start worker pool: {e}")))?;

    let ledger = Ledger::new();
    let results: Vec<(RepoOutcome, Option<RepoTally>)> = pool.install(|| {
        job.repos
            .par_iter()
            .map(|(repo, app)| run_repo_task(source, job, &ledger, repo, app))
            .collect()
    });

    let mut report = ReconcileReport::default();
    for (outcome, tally) in results {
        if let Some(tally) = tally {
            if !tally.matches.is_empty() {
                report.matches.entry(outcome.app.clone()).or_default().extend(tally.matches);
            }
            if !tally.orphans.is_empty() {
                report.orphans.entry(outcome.app.clone()).or_default().extend(tally.orphans);
            }
        }
        report.repos.push(outcome);
    }

    report.missing = ledger.missing(job.catalog);
    tracing::info!(
        "Reconciled {} repositories: {} matches, {} of {} tracked issues missing from git",
        report.repos.len(),
        report.total_matches(),
        report.missing.len(),
        job.catalog.len()
    );
    Ok(report)
}

fn run_repo_task(
    source: &dyn CommitSource,
    job: &ReconcileJob<'_>,
    ledger: &Ledger,
    repo: &str,
    app: &str,
) -> (RepoOutcome, Option<RepoTally>) {
    match process_repo(source, job, repo, app) {
        Ok(tally) => {
            ledger.record_matches(app, &tally.matches);
            let outcome = RepoOutcome {
                repo: repo.to_string(),
                app: app.to_string(),
                status: RepoStatus::Ok,
                error: None,
                commits_seen: tally.commits_seen,
                matches: tally.matches.len(),
                orphans: tally.orphans.len(),
            };
            (outcome, Some(tally))
        }
        Err(err) => {
            tracing::error!(repo = %repo, app = %app, "Failed processing {}: {}", repo, err);
            let outcome = RepoOutcome {
                repo: repo.to_string(),
                app: app.to_string(),
                status: RepoStatus::Failed,
                error: Some(err.to_string()),
                commits_seen: 0,
                matches: 0,
                orphans: 0,
            };
            (outcome, None)
        }
    }
}

fn process_repo(
    source: &dyn CommitSource,
    job: &ReconcileJob<'_>,
    repo: &str,
    app: &str,
) -> Result<RepoTally> {
    let ctx = ExtractionContext {
        fix_version: job.fix_version,
        catalog: job.catalog,
        app_name: app,
        window: job.window,
        develop_branch: job.develop_branch,
        exclusions: job.exclusions,
    };

    let mut tally = RepoTally::default();
    for branch in job.branches {
        tracing::info!("Fetching commits for {} ({}) branch {}", repo, app, branch);
        let commits = source.fetch_commits(repo, branch, job.window)?;
        tally.commits_seen += commits.len();

        for commit in &commits {
            let matches = extract(commit, &ctx);
            if matches.is_empty() {
                tally.orphans.push(OrphanCommit {
                    app: app.to_string(),
                    repo: commit.repo.clone(),
                    commit_id: commit.id.clone(),
                    message: clean(&commit.message),
                    branch: commit.branch.clone(),
                });
            } else {
                tally.matches.extend(matches);
            }
        }
    }
    Ok(tally)
}
