//! gitxjira: report Jira issues with and without matching Bitbucket commits

use anyhow::Result;

fn main() -> Result<()> {
    gitxjira::cli::run()
}
