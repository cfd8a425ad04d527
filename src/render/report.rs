//! Report JSON generation.

use crate::domain::{DateWindow, ReconcileReport, REPORT_SCHEMA_VERSION};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

const WINDOW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Base file name for a run, optionally stamped `_{YYYYMMDD-HHMM}`.
pub fn report_stem(include_timestamp: bool) -> String {
    if include_timestamp {
        format!("gitxjira_report_{}", Utc::now().format("%Y%m%d-%H%M"))
    } else {
        "gitxjira_report".to_string()
    }
}

pub fn window_value(window: &DateWindow) -> Value {
    json!({
        "release_date": window.release_date.format(WINDOW_DATE_FORMAT).to_string(),
        "code_freeze_date": window.code_freeze_date.format(WINDOW_DATE_FORMAT).to_string(),
        "cutoff_date": window.cutoff_date.format(WINDOW_DATE_FORMAT).to_string(),
    })
}

/// Write `{stem}.json` into `output_dir` and return its path.
pub fn write_report(
    output_dir: &Path,
    stem: &str,
    report: &ReconcileReport,
    window: &DateWindow,
    fix_version: &str,
    include_timestamp: bool,
) -> Result<PathBuf> {
    let mut root = Map::new();
    root.insert("schema_version".to_string(), Value::String(REPORT_SCHEMA_VERSION.to_string()));
    if include_timestamp {
        root.insert(
            "generated_at".to_string(),
            Value::String(Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
        );
    }
    root.insert("fix_version".to_string(), Value::String(fix_version.to_string()));
    root.insert("window".to_string(), window_value(window));
    root.insert(
        "summary".to_string(),
        json!({
            "matches": report.total_matches(),
            "missing": report.missing.len(),
            "orphans": report.total_orphans(),
        }),
    );
    root.insert("matches".to_string(), serde_json::to_value(&report.matches)?);
    root.insert("missing".to_string(), serde_json::to_value(&report.missing)?);
    root.insert("orphans".to_string(), serde_json::to_value(&report.orphans)?);
    root.insert("repos".to_string(), serde_json::to_value(&report.repos)?);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed creating output directory: {}", output_dir.display()))?;
    let path = output_dir.join(format!("{stem}.json"));
    std::fs::write(&path, serde_json::to_string_pretty(&Value::Object(root))?)
        .with_context(|| format!("Failed writing report: {}", path.display()))?;
    Ok(path)
}
