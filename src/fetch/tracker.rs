//! Jira issue search, used as an alternative catalog source to a CSV export.
//!
//! Only the search itself lives here; the bearer token is supplied by the
//! caller (environment), acquiring or refreshing it is out of scope.

use crate::catalog::IssueCatalog;
use crate::domain::IssueRecord;
use crate::error::{ReconcileError, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;

const SEARCH_FIELDS: &str = "key,summary,issuetype,fixVersions,components";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    issues: Vec<RawIssue>,
    #[serde(default)]
    start_at: u64,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    key: String,
    #[serde(default)]
    fields: RawFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    issuetype: Option<Named>,
    #[serde(default)]
    fix_versions: Vec<Named>,
    #[serde(default)]
    components: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

fn join_names(items: &[Named]) -> String {
    items.iter().map(|n| n.name.as_str()).collect::<Vec<_>>().join(", ")
}

impl RawIssue {
    fn into_record(self, link_base: &str) -> IssueRecord {
        let key = self.key.trim().to_uppercase();
        IssueRecord {
            issue_type: self.fields.issuetype.map(|t| t.name).unwrap_or_default(),
            fix_version: join_names(&self.fields.fix_versions),
            app: join_names(&self.fields.components),
            summary: self.fields.summary.unwrap_or_default(),
            link: format!("{link_base}/{key}"),
            key,
        }
    }
}

/// Blocking client for `{base}/search`.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    base_url: String,
    token: String,
    page_size: u32,
    http: Client,
}

impl TrackerClient {
    pub fn new(base_url: &str, token: impl Into<String>, page_size: u32) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ReconcileError::remote(None, format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            page_size: page_size.max(1),
            http,
        })
    }

    /// Run `jql` and collect every result page into a catalog.
    pub fn search(&self, jql: &str, link_base_url: &str) -> Result<IssueCatalog> {
        let url = format!("{}/search", self.base_url);
        let link_base = link_base_url.trim_end_matches('/');
        let mut records = Vec::new();
        let mut start_at = 0u64;

        loop {
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .header(ACCEPT, "application/json")
                .query(&[("jql", jql), ("fields", SEARCH_FIELDS)])
                .query(&[("startAt", start_at), ("maxResults", u64::from(self.page_size))])
                .send()?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(ReconcileError::remote(
                    Some(status.as_u16()),
                    format!("issue search returned {status}: {}", body.trim()),
                ));
            }
            let page: SearchPage = response.json().map_err(|e| {
                ReconcileError::remote(Some(status.as_u16()), format!("malformed search page: {e}"))
            })?;

            let received = page.issues.len() as u64;
            records.extend(page.issues.into_iter().map(|i| i.into_record(link_base)));

            let next = page.start_at + received;
            if received == 0 || next >= page.total {
                break;
            }
            start_at = next;
        }

        tracing::info!("Loaded {} tracked issues from issue search", records.len());
        Ok(IssueCatalog::from_records(records))
    }
}
