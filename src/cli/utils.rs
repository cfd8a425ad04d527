//! Shared CLI utilities.

use anyhow::Result;
use std::path::Path;

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Load `{dir}/.env` into the process environment when it exists.
///
/// Variables already set in the environment are left alone.
pub fn load_dotenv(dir: &Path) -> Result<()> {
    let path = dir.join(".env");
    if path.is_file() {
        dotenvy::from_path(&path)?;
        tracing::debug!("Loaded environment from {}", path.display());
    }
    Ok(())
}
