//! Reconcile command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use super::utils::{load_dotenv, parse_csv};
use crate::catalog::{load_catalog, IssueCatalog};
use crate::config::{bitbucket_credentials, load_config, merge_config, CliOverrides, EnvOverrides};
use crate::domain::{Config, RepoStatus};
use crate::extract::ExclusionSet;
use crate::fetch::{BitbucketClient, TrackerClient, DEFAULT_FETCH_LIMIT};
use crate::orchestrate::{reconcile, ReconcileJob};
use crate::render::{report_stem, write_report, write_tables};
use crate::window::derive_window;

#[derive(Args)]
pub struct ReconcileArgs {
    /// Exported Jira issues (CSV or JSON)
    #[arg(long, value_name = "FILE", conflicts_with = "jql")]
    pub catalog: Option<PathBuf>,

    /// Load tracked issues with a Jira search instead of an export (needs JIRA_TOKEN)
    #[arg(long, value_name = "QUERY")]
    pub jql: Option<String>,

    /// Path to config file (gitxjira.toml, .yml or .json)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target fix version, e.g. 'Mobilitas 2025.04.18'
    #[arg(long, value_name = "VERSION")]
    pub fix_version: Option<String>,

    /// Develop branch name
    #[arg(long, value_name = "BRANCH")]
    pub develop_branch: Option<String>,

    /// Release branch name
    #[arg(long, value_name = "BRANCH")]
    pub release_branch: Option<String>,

    /// Only check the develop branch
    #[arg(long)]
    pub develop_only: bool,

    /// Regex patterns for issue keys to ignore (comma-separated, matched at the key start)
    #[arg(short = 'x', long, value_name = "PATTERNS")]
    pub exclude: Option<String>,

    /// Days between code freeze and the earliest commit considered
    #[arg(long, value_name = "DAYS")]
    pub cutoff_days: Option<u32>,

    /// Days between code freeze and release
    #[arg(long, value_name = "DAYS")]
    pub freeze_days: Option<u32>,

    /// Number of repositories processed concurrently
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Directory for report files
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Omit timestamps from report names and contents
    #[arg(long)]
    pub no_timestamp: bool,
}

pub fn run(args: ReconcileArgs) -> Result<()> {
    let start_time = Instant::now();

    if args.catalog.is_none() && args.jql.is_none() {
        anyhow::bail!("Either --catalog or --jql must be specified");
    }

    let cwd = std::env::current_dir()?;
    load_dotenv(&cwd)?;

    let file_config = load_config(&cwd, args.config.as_deref())?;
    let cli_overrides = CliOverrides {
        fix_version: args.fix_version.clone(),
        develop_branch: args.develop_branch.clone(),
        release_branch: args.release_branch.clone(),
        develop_only: if args.develop_only { Some(true) } else { None },
        exclude_patterns: parse_csv(&args.exclude),
        output_dir: args.output_dir.clone(),
        max_workers: args.max_workers,
        cutoff_days: args.cutoff_days,
        freeze_days: args.freeze_days,
    };
    let merged = merge_config(file_config, EnvOverrides::from_env()?, cli_overrides);

    if merged.repos.is_empty() {
        anyhow::bail!("No repositories configured; add a [repos] table to gitxjira.toml");
    }
    let credentials = bitbucket_credentials(|name| std::env::var(name).ok())?;

    let window = derive_window(
        Some(&merged.fix_version),
        &merged.release_prefix,
        merged.code_freeze_days_before_release,
        merged.cutoff_days_before_code_freeze,
    )?;
    tracing::info!("Release Date: {}", window.release_date.format("%Y-%m-%d"));
    tracing::info!("Code Freeze Date: {}", window.code_freeze_date.format("%Y-%m-%d"));
    tracing::info!("Cutoff Date: {}", window.cutoff_date.format("%Y-%m-%d"));

    let exclusions = ExclusionSet::new(&merged.exclude_patterns)?;
    let catalog = load_tracked_issues(&args, &merged)?;

    let client =
        BitbucketClient::new(&merged.bitbucket_base_url, credentials, merged.commit_fetch_limit)?;
    let branches = merged.branches();
    let job = ReconcileJob {
        repos: &merged.repos,
        branches: &branches,
        develop_branch: &merged.develop_branch,
        fix_version: &merged.fix_version,
        catalog: &catalog,
        window: &window,
        exclusions: &exclusions,
        max_workers: merged.max_workers,
    };
    let report = reconcile(&client, &job)?;

    let include_timestamp = !args.no_timestamp;
    let stem = report_stem(include_timestamp);
    let report_path = write_report(
        &merged.output_dir,
        &stem,
        &report,
        &window,
        &merged.fix_version,
        include_timestamp,
    )?;
    let mut output_files = vec![report_path];
    output_files.extend(write_tables(&merged.output_dir, &stem, &report)?);
    tracing::info!("Generated report: {}", output_files[0].display());

    println!();
    println!("Reconciliation complete!");
    println!();
    println!("Statistics:");
    println!("  Fix version:     {}", merged.fix_version);
    println!(
        "  Window:          {} .. {}",
        window.cutoff_date.format("%Y-%m-%d"),
        window.code_freeze_date.format("%Y-%m-%d")
    );
    println!("  Tracked issues:  {}", catalog.len());
    println!("  Matches:         {}", report.total_matches());
    println!("  Missing from git: {}", report.missing.len());
    println!("  Orphan commits:  {}", report.total_orphans());
    for outcome in &report.repos {
        match outcome.status {
            RepoStatus::Ok => println!(
                "  {} ({}): {} commits, {} matches",
                outcome.repo, outcome.app, outcome.commits_seen, outcome.matches
            ),
            RepoStatus::Failed => println!(
                "  {} ({}): FAILED {}",
                outcome.repo,
                outcome.app,
                outcome.error.as_deref().unwrap_or("")
            ),
        }
    }
    println!("  Processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!();
    println!("Output files:");
    for out in &output_files {
        println!("  {}", out.display());
    }

    Ok(())
}

fn load_tracked_issues(args: &ReconcileArgs, config: &Config) -> Result<IssueCatalog> {
    if let Some(path) = &args.catalog {
        return Ok(load_catalog(path, &config.link_base_url)?);
    }

    let jql = args.jql.as_deref().unwrap_or_default();
    let base_url = config
        .tracker_base_url
        .as_deref()
        .context("--jql requires tracker_base_url in the config file")?;
    let token = std::env::var("JIRA_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())
        .context("--jql requires the JIRA_TOKEN environment variable")?;

    let tracker = TrackerClient::new(base_url, token.trim(), DEFAULT_FETCH_LIMIT)?;
    Ok(tracker.search(jql, &config.link_base_url)?)
}
