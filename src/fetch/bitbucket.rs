//! Bitbucket Server commit listing

use super::{CommitSource, RepoSpec};
use crate::domain::{Commit, DateWindow};
use crate::error::{ReconcileError, Result};
use crate::window::commit_moment;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Largest page size the commits endpoint honours.
pub const DEFAULT_FETCH_LIMIT: u32 = 100;

/// Basic-auth credentials (account e-mail and personal access token).
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self { username: username.into(), token: token.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CommitPage {
    #[serde(default)]
    values: Vec<RawCommit>,
    #[serde(rename = "isLastPage", default = "default_last_page")]
    is_last_page: bool,
    #[serde(rename = "nextPageStart")]
    next_page_start: Option<u64>,
}

fn default_last_page() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    id: String,
    #[serde(default)]
    message: String,
    #[serde(rename = "authorTimestamp")]
    author_timestamp: i64,
}

/// Blocking REST client for `/projects/{p}/repos/{r}/commits`.
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    base_url: String,
    credentials: Credentials,
    page_size: u32,
    http: Client,
}

impl BitbucketClient {
    pub fn new(base_url: &str, credentials: Credentials, page_size: u32) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ReconcileError::remote(None, format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            page_size: page_size.max(1),
            http,
        })
    }

    fn commits_url(&self, spec: &RepoSpec) -> String {
        format!("{}/projects/{}/repos/{}/commits", self.base_url, spec.project, spec.repo)
    }

    fn fetch_page(&self, url: &str, branch: &str, start: u64) -> Result<CommitPage> {
        let at = format!("refs/heads/{branch}");
        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.token))
            .header(ACCEPT, "application/json")
            .query(&[("at", at.as_str())])
            .query(&[("start", start), ("limit", u64::from(self.page_size))])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReconcileError::remote(
                Some(status.as_u16()),
                format!("GET {url} returned {status}: {}", body.trim()),
            ));
        }
        response.json::<CommitPage>().map_err(|e| {
            ReconcileError::remote(Some(status.as_u16()), format!("malformed commit page: {e}"))
        })
    }
}

impl CommitSource for BitbucketClient {
    /// Walk every page of the branch history, keeping commits inside the window.
    ///
    /// Any failure discards the pages already read for this branch.
    fn fetch_commits(&self, repo: &str, branch: &str, window: &DateWindow) -> Result<Vec<Commit>> {
        let spec = RepoSpec::parse(repo)?;
        let url = self.commits_url(&spec);
        tracing::debug!("Fetching commits from {} at refs/heads/{}", url, branch);

        let mut commits = Vec::new();
        let mut start = 0u64;
        loop {
            let page = self.fetch_page(&url, branch, start).map_err(|e| {
                tracing::warn!("Failed to fetch commits for {} branch {}: {}", repo, branch, e);
                e
            })?;

            for raw in page.values {
                let Some(moment) = commit_moment(raw.author_timestamp) else {
                    tracing::warn!(
                        "Dropping commit {} with unrepresentable timestamp {}",
                        raw.id,
                        raw.author_timestamp
                    );
                    continue;
                };
                if !window.contains(moment) {
                    continue;
                }
                commits.push(Commit {
                    id: raw.id,
                    message: raw.message,
                    author_timestamp_millis: raw.author_timestamp,
                    branch: branch.to_string(),
                    repo: repo.to_string(),
                });
            }

            if page.is_last_page {
                break;
            }
            let next = page.next_page_start.unwrap_or(start + u64::from(self.page_size));
            if next <= start {
                return Err(ReconcileError::remote(
                    None,
                    format!("pagination for {repo} branch {branch} did not advance past {start}"),
                ));
            }
            start = next;
        }

        tracing::info!("Total commits fetched for {} branch {}: {}", repo, branch, commits.len());
        Ok(commits)
    }
}
