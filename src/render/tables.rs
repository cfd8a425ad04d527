//! CSV tables: one sheet per application, plus missing issues and orphan commits.

use crate::domain::{MissingIssue, ReconcileReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

const MISSING_HEADERS: [&str; 8] =
    ["Issue Key", "Issue Type", "Summary", "App", "Fix Version", "Link", "Missing From", "Notes"];

/// Make an application name safe to use as a file name.
pub fn sheet_file_name(app: &str) -> String {
    let cleaned: String = app
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).with_context(|| format!("Failed writing {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_missing(path: &Path, missing: &[MissingIssue]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed creating {}", path.display()))?;
    writer.write_record(MISSING_HEADERS)?;
    for m in missing {
        let r = &m.record;
        writer.write_record([
            r.key.as_str(),
            r.issue_type.as_str(),
            r.summary.as_str(),
            r.app.as_str(),
            r.fix_version.as_str(),
            r.link.as_str(),
            m.missing_from.as_str(),
            m.notes.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `{stem}_{app}.csv` per application, `{stem}_missing_issues.csv` when
/// anything is missing and `{stem}_orphan_commits.csv` (every app, tagged with
/// `App` and `Repository`) when orphans exist.
pub fn write_tables(output_dir: &Path, stem: &str, report: &ReconcileReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed creating output directory: {}", output_dir.display()))?;
    let mut written = Vec::new();

    for (app, matches) in &report.matches {
        tracing::info!("Exporting {} with {} commits", app, matches.len());
        let path = output_dir.join(format!("{stem}_{}.csv", sheet_file_name(app)));
        write_rows(&path, matches)?;
        written.push(path);
    }

    if report.missing.is_empty() {
        tracing::info!("No missing issues found or no commits fetched to compare.");
    } else {
        let path = output_dir.join(format!("{stem}_missing_issues.csv"));
        write_missing(&path, &report.missing)?;
        written.push(path);
    }

    if report.total_orphans() > 0 {
        let orphans: Vec<_> = report.orphans.values().flatten().collect();
        let path = output_dir.join(format!("{stem}_orphan_commits.csv"));
        write_rows(&path, &orphans)?;
        written.push(path);
    }

    Ok(written)
}
