//! Remote fetching (Bitbucket commits, Jira issues)

use crate::domain::{Commit, DateWindow};
use crate::error::{ReconcileError, Result};
use std::fmt;

pub mod bitbucket;
pub mod tracker;

pub use bitbucket::{BitbucketClient, Credentials, DEFAULT_FETCH_LIMIT};
pub use tracker::TrackerClient;

/// A repository identifier split into its Bitbucket project and slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    pub project: String,
    pub repo: String,
}

impl RepoSpec {
    /// Parse `PROJECT/REPO`; anything else is [`ReconcileError::InvalidInput`].
    pub fn parse(qualified: &str) -> Result<Self> {
        let mut parts = qualified.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(project), Some(repo), None) if !project.is_empty() && !repo.is_empty() => {
                Ok(Self { project: project.to_string(), repo: repo.to_string() })
            }
            _ => {
                tracing::error!("Invalid repo_name format: {}. Expected 'PROJECT/REPO'.", qualified);
                Err(ReconcileError::InvalidInput(format!(
                    "invalid repository '{qualified}', expected 'PROJECT/REPO'"
                )))
            }
        }
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.repo)
    }
}

/// Source of commit history for one repository branch.
///
/// Implementations return only commits whose author time lies inside
/// `[window.cutoff_date, window.code_freeze_date]`.
pub trait CommitSource: Send + Sync {
    fn fetch_commits(&self, repo: &str, branch: &str, window: &DateWindow) -> Result<Vec<Commit>>;
}
