//! Typed errors for the reconciliation core.
//!
//! The CLI layer wraps these in `anyhow` with context; library code returns
//! [`ReconcileError`] so callers can tell configuration problems apart from
//! remote failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Bad settings: malformed exclusion pattern, empty repository map, etc.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed caller input, e.g. a repository name that is not `PROJECT/REPO`.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A release identifier that does not reduce to a `YYYY.MM.DD` date.
    #[error("cannot parse release date from '{identifier}': {reason}")]
    Parse { identifier: String, reason: String },

    /// Non-success status, transport failure or undecodable body from a REST endpoint.
    #[error("remote fetch failed{}: {message}", status_suffix(.status))]
    RemoteFetch { status: Option<u16>, message: String },

    /// The issue catalog could not be read or lacks required columns.
    #[error("issue catalog error: {0}")]
    Catalog(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl ReconcileError {
    pub(crate) fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteFetch { status, message: message.into() }
    }
}

impl From<reqwest::Error> for ReconcileError {
    fn from(err: reqwest::Error) -> Self {
        Self::remote(err.status().map(|s| s.as_u16()), err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_fetch_message_includes_status_when_known() {
        let err = ReconcileError::remote(Some(502), "bad gateway");
        assert_eq!(err.to_string(), "remote fetch failed (HTTP 502): bad gateway");

        let err = ReconcileError::remote(None, "connection refused");
        assert_eq!(err.to_string(), "remote fetch failed: connection refused");
    }
}
