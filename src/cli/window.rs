//! Window command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::load_dotenv;
use crate::config::{load_config, merge_config, CliOverrides, EnvOverrides};
use crate::render::window_value;
use crate::window::derive_window;

#[derive(Args)]
pub struct WindowArgs {
    /// Fix version / release identifier, e.g. 'Mobilitas 2025.04.18'
    #[arg(long, value_name = "VERSION")]
    pub fix_version: Option<String>,

    /// Days between code freeze and the earliest commit considered
    #[arg(long, value_name = "DAYS")]
    pub cutoff_days: Option<u32>,

    /// Days between code freeze and release
    #[arg(long, value_name = "DAYS")]
    pub freeze_days: Option<u32>,

    /// Path to config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the window as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WindowArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    load_dotenv(&cwd)?;

    let file_config = load_config(&cwd, args.config.as_deref())?;
    let cli_overrides = CliOverrides {
        fix_version: args.fix_version,
        cutoff_days: args.cutoff_days,
        freeze_days: args.freeze_days,
        ..Default::default()
    };
    let merged = merge_config(file_config, EnvOverrides::from_env()?, cli_overrides);

    let window = derive_window(
        Some(&merged.fix_version),
        &merged.release_prefix,
        merged.code_freeze_days_before_release,
        merged.cutoff_days_before_code_freeze,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&window_value(&window))?);
    } else {
        println!("Release Date: {}", window.release_date.format("%Y-%m-%d"));
        println!("Code Freeze Date: {}", window.code_freeze_date.format("%Y-%m-%d"));
        println!("Cutoff Date: {}", window.cutoff_date.format("%Y-%m-%d"));
    }
    Ok(())
}
