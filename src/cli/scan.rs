//! Scan command: dry-run the message normalizer and key extractor.

use anyhow::Result;
use clap::Args;

use super::utils::parse_csv;
use crate::extract::{clean, preprocess, scan_keys, ExclusionSet};

#[derive(Args)]
pub struct ScanArgs {
    /// Raw commit message
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Regex patterns for issue keys to ignore (comma-separated)
    #[arg(short = 'x', long, value_name = "PATTERNS")]
    pub exclude: Option<String>,
}

pub fn run(args: ScanArgs) -> Result<()> {
    let patterns = parse_csv(&args.exclude).unwrap_or_default();
    let exclusions = ExclusionSet::new(&patterns)?;

    let cleaned = clean(&args.message);
    let preprocessed = preprocess(&cleaned);
    let keys = scan_keys(&preprocessed, &exclusions);

    println!("Cleaned: {cleaned}");
    println!("Preprocessed: {preprocessed}");
    if keys.is_empty() {
        println!("Issue keys: (none)");
    } else {
        println!("Issue keys: {}", keys.join(", "));
    }
    Ok(())
}
