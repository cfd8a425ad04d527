//! gitxjira: reconcile source-control history against a release backlog
//!
//! For each configured Bitbucket repository and branch, commits inside the
//! release window are fetched, their messages are scanned for Jira issue keys,
//! and the keys are checked against the tracked issues of the target fix
//! version. The result lists which tracked issues have commits and which are
//! missing from source control.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ledger;
pub mod orchestrate;
pub mod render;
pub mod window;

pub use error::{ReconcileError, Result};
