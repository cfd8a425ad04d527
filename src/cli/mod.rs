//! Command-line interface for gitxjira
//!
//! Provides `reconcile`, `window`, `scan` and `completions` subcommands.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod reconcile;
mod scan;
mod utils;
mod window;

/// Reconcile Bitbucket commit history against a Jira release backlog
#[derive(Parser)]
#[command(name = "gitxjira")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write the log to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Match commits to tracked issues and report issues missing from git
    Reconcile(Box<reconcile::ReconcileArgs>),

    /// Print the release, code-freeze and cutoff dates for a fix version
    Window(window::WindowArgs),

    /// Show how a commit message is cleaned and which issue keys it yields
    Scan(scan::ScanArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DATA_FILE_SUFFIXES: &[&str] = &[".csv", ".xlsx", ".json"];

pub fn run() -> Result<()> {
    if let Some(first) = std::env::args_os().nth(1) {
        data_file_guard(&first.to_string_lossy())?;
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Reconcile(args) => reconcile::run(*args),
        Commands::Window(args) => window::run(args),
        Commands::Scan(args) => scan::run(args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "gitxjira", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn data_file_guard(first: &str) -> Result<()> {
    let lower = first.to_ascii_lowercase();
    if DATA_FILE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        anyhow::bail!(
            "It looks like you passed a data file as the command. Run:\n  gitxjira reconcile --catalog \"{first}\""
        );
    }
    Ok(())
}

/// RUST_LOG always takes precedence; otherwise `--verbose` selects DEBUG and the default is INFO.
fn init_tracing(verbose: bool, log_file: Option<&std::path::Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed creating log file: {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .try_init();
    Ok(())
}
