//! Configuration loading and merging
//!
//! Handles loading from config files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults). Credentials are read
//! from the environment only and never live in [`Config`](crate::domain::Config).

pub mod loader;
pub mod merge;

pub use loader::load_config;
pub use merge::{merge_config, CliOverrides, EnvOverrides};

use crate::fetch::Credentials;
use anyhow::Result;

/// Read `BITBUCKET_EMAIL` / `BITBUCKET_TOKEN`, naming whichever are absent.
pub fn bitbucket_credentials(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
    let email = lookup("BITBUCKET_EMAIL").filter(|v| !v.trim().is_empty());
    let token = lookup("BITBUCKET_TOKEN").filter(|v| !v.trim().is_empty());
    match (email, token) {
        (Some(email), Some(token)) => Ok(Credentials::new(email.trim(), token.trim())),
        (email, token) => {
            let mut missing = Vec::new();
            if email.is_none() {
                missing.push("BITBUCKET_EMAIL");
            }
            if token.is_none() {
                missing.push("BITBUCKET_TOKEN");
            }
            anyhow::bail!("Missing required environment variables: {}", missing.join(", "))
        }
    }
}
