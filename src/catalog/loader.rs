//! Catalog loading from tracker exports (CSV or JSON)

use super::IssueCatalog;
use crate::domain::IssueRecord;
use crate::error::{ReconcileError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const KEY_COLUMNS: &[&str] = &["issue_key", "key"];
const REQUIRED_COLUMNS: &[&str] = &["summary", "issue_type"];
const APP_COLUMNS: &[&str] = &["components", "component/s", "app"];
const FIX_VERSION_COLUMNS: &[&str] = &["fix_versions", "fix_version/s", "fix_version"];
const LINK_COLUMNS: &[&str] = &["issue_link", "link"];

type Row = HashMap<String, String>;

/// Normalize an export header: trimmed, spaces to underscores, lower-case.
pub fn normalize_column(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Load a tracker export into an [`IssueCatalog`].
///
/// `.csv` files are read with a header row; `.json` files must hold an array
/// of flat objects. Missing links default to `{link_base_url}/{KEY}`.
pub fn load_catalog(path: &Path, link_base_url: &str) -> Result<IssueCatalog> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let read = || {
        fs::read_to_string(path).map_err(|e| {
            ReconcileError::Catalog(format!("failed reading {}: {e}", path.display()))
        })
    };

    let (columns, rows) = match ext.as_str() {
        "csv" => parse_csv_rows(&read()?)?,
        "json" => parse_json_rows(&read()?)?,
        "xlsx" | "xls" => {
            return Err(ReconcileError::Catalog(format!(
                "{}: spreadsheet workbooks are not supported, export the issues as CSV",
                path.display()
            )))
        }
        other => {
            return Err(ReconcileError::Catalog(format!(
                "unsupported catalog extension '.{other}' for {}",
                path.display()
            )))
        }
    };

    let catalog = records_from_rows(&columns, rows, link_base_url)?;
    tracing::info!("Loaded {} tracked issues from {}", catalog.len(), path.display());
    Ok(catalog)
}

fn parse_csv_rows(content: &str) -> Result<(Vec<String>, Vec<Row>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconcileError::Catalog(format!("invalid CSV header: {e}")))?
        .iter()
        .map(normalize_column)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconcileError::Catalog(format!("invalid CSV row: {e}")))?;
        let mut row = Row::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            // Repeated headers: first non-empty value wins.
            let cell = row.entry(header.clone()).or_default();
            if cell.is_empty() {
                *cell = value.to_string();
            }
        }
        rows.push(row);
    }
    Ok((headers, rows))
}

fn parse_json_rows(content: &str) -> Result<(Vec<String>, Vec<Row>)> {
    let parsed: Value = serde_json::from_str(content)
        .map_err(|e| ReconcileError::Catalog(format!("invalid JSON: {e}")))?;
    let Value::Array(items) = parsed else {
        return Err(ReconcileError::Catalog("JSON catalog must be an array of objects".into()));
    };

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(map) = item else {
            return Err(ReconcileError::Catalog("JSON catalog entries must be objects".into()));
        };
        let mut row = Row::new();
        for (name, value) in map {
            let column = normalize_column(&name);
            if !columns.contains(&column) {
                columns.push(column.clone());
            }
            row.insert(column, json_cell(&value));
        }
        rows.push(row);
    }
    Ok((columns, rows))
}

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items.iter().map(json_cell).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn records_from_rows(columns: &[String], rows: Vec<Row>, link_base_url: &str) -> Result<IssueCatalog> {
    let has = |name: &str| columns.iter().any(|c| c == name);

    let key_column = KEY_COLUMNS
        .iter()
        .find(|c| has(c))
        .ok_or_else(|| ReconcileError::Catalog("missing required column 'Issue key'".into()))?;

    let missing: Vec<&str> = REQUIRED_COLUMNS.iter().copied().filter(|c| !has(c)).collect();
    if !missing.is_empty() {
        return Err(ReconcileError::Catalog(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let link_base = link_base_url.trim_end_matches('/');
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let key = row.get(*key_column).map(|k| k.trim().to_uppercase()).unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        let first = |candidates: &[&str]| {
            candidates.iter().find_map(|c| row.get(*c).filter(|v| !v.is_empty())).cloned()
        };

        records.push(IssueRecord {
            issue_type: row.get("issue_type").cloned().unwrap_or_default(),
            summary: row.get("summary").cloned().unwrap_or_default(),
            app: first(APP_COLUMNS).unwrap_or_default(),
            fix_version: first(FIX_VERSION_COLUMNS).unwrap_or_default(),
            link: first(LINK_COLUMNS).unwrap_or_else(|| format!("{link_base}/{key}")),
            key,
        });
    }
    Ok(IssueCatalog::from_records(records))
}
