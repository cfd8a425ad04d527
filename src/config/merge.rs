//! Layering of environment and CLI values over the file config.

use crate::domain::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Values given on the command line; `None` leaves the lower layer untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub fix_version: Option<String>,
    pub develop_branch: Option<String>,
    pub release_branch: Option<String>,
    pub develop_only: Option<bool>,
    pub exclude_patterns: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub max_workers: Option<usize>,
    pub cutoff_days: Option<u32>,
    pub freeze_days: Option<u32>,
}

/// Values read from process environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub fix_version: Option<String>,
    pub release_branch: Option<String>,
    pub develop_branch: Option<String>,
    pub bitbucket_base_url: Option<String>,
    pub commit_fetch_limit: Option<u32>,
    pub cutoff_days: Option<u32>,
    pub freeze_days: Option<u32>,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let number = |name: &str| -> Result<Option<u32>> {
            get(name)
                .map(|v| v.parse::<u32>().with_context(|| format!("{name} must be a whole number, got '{v}'")))
                .transpose()
        };

        Ok(Self {
            fix_version: get("FIX_VERSION"),
            release_branch: get("RELEASE_BRANCH"),
            develop_branch: get("DEVELOP_BRANCH"),
            bitbucket_base_url: get("BITBUCKET_BASE_URL"),
            commit_fetch_limit: number("COMMIT_FETCH_LIMIT")?,
            cutoff_days: number("CUTOFF_DAYS")?,
            freeze_days: number("CODE_FREEZE_DAYS")?,
        })
    }
}

/// Apply CLI > environment > file precedence.
pub fn merge_config(file: Config, env: EnvOverrides, cli: CliOverrides) -> Config {
    let mut merged = file;

    if let Some(v) = env.fix_version {
        merged.fix_version = v;
    }
    if let Some(v) = env.release_branch {
        merged.release_branch = v;
    }
    if let Some(v) = env.develop_branch {
        merged.develop_branch = v;
    }
    if let Some(v) = env.bitbucket_base_url {
        merged.bitbucket_base_url = v;
    }
    if let Some(v) = env.commit_fetch_limit {
        merged.commit_fetch_limit = v;
    }
    if let Some(v) = env.cutoff_days {
        merged.cutoff_days_before_code_freeze = v;
    }
    if let Some(v) = env.freeze_days {
        merged.code_freeze_days_before_release = v;
    }

    if let Some(v) = cli.fix_version {
        merged.fix_version = v;
    }
    if let Some(v) = cli.develop_branch {
        merged.develop_branch = v;
    }
    if let Some(v) = cli.release_branch {
        merged.release_branch = v;
    }
    if let Some(v) = cli.develop_only {
        merged.develop_only = v;
    }
    if let Some(v) = cli.exclude_patterns {
        merged.exclude_patterns = v;
    }
    if let Some(v) = cli.output_dir {
        merged.output_dir = v;
    }
    if let Some(v) = cli.max_workers {
        merged.max_workers = v;
    }
    if let Some(v) = cli.cutoff_days {
        merged.cutoff_days_before_code_freeze = v;
    }
    if let Some(v) = cli.freeze_days {
        merged.code_freeze_days_before_release = v;
    }

    merged
}
