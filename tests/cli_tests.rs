//! Integration tests for CLI

use assert_cmd::Command;
use chrono::NaiveDate;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::thread;
use tempfile::TempDir;

const ENV_OVERRIDES: &[&str] = &[
    "FIX_VERSION",
    "RELEASE_BRANCH",
    "DEVELOP_BRANCH",
    "BITBUCKET_BASE_URL",
    "COMMIT_FETCH_LIMIT",
    "CUTOFF_DAYS",
    "CODE_FREEZE_DAYS",
    "BITBUCKET_EMAIL",
    "BITBUCKET_TOKEN",
    "JIRA_TOKEN",
    "RUST_LOG",
];

/// A command running in `dir` with none of the tool's environment variables set.
fn gitxjira(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gitxjira"));
    cmd.current_dir(dir);
    for var in ENV_OVERRIDES {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_version() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gitxjira"));
}

#[test]
fn test_cli_help() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reconcile Bitbucket commit history"))
        .stdout(predicate::str::contains("reconcile"))
        .stdout(predicate::str::contains("window"))
        .stdout(predicate::str::contains("scan"));
}

#[test]
fn test_window_prints_derived_dates() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .args(["window", "--fix-version", "Mobilitas 2025.04.18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Release Date: 2025-04-18"))
        .stdout(predicate::str::contains("Code Freeze Date: 2025-04-01"))
        .stdout(predicate::str::contains("Cutoff Date: 2025-03-04"));
}

#[test]
fn test_window_uses_config_offsets() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(
        tmp.path().join("gitxjira.toml"),
        "fix_version = 'Mobilitas 2025.01.31'\ncode_freeze_days_before_release = 1\n\
         cutoff_days_before_code_freeze = 10\n",
    )
    .expect("write config");

    let output = gitxjira(tmp.path()).args(["window", "--json"]).output().expect("run");
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["code_freeze_date"], "2025-01-30 00:00:00");
    assert_eq!(value["cutoff_date"], "2025-01-20 00:00:00");
}

#[test]
fn test_window_rejects_unparseable_release() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .args(["window", "--fix-version", "Mobilitas next"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse release date"));
}

#[test]
fn test_scan_collapses_suffixes() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .args(["scan", "ABC-123_hotfix applied"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preprocessed: ABC-123 applied"))
        .stdout(predicate::str::contains("Issue keys: ABC-123\n"));
}

#[test]
fn test_scan_honours_exclusions() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .args(["scan", "--exclude", "cve,utf", "Patch CVE-2024 and UTF-8 for ABC-9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Issue keys: ABC-9\n"));
}

#[test]
fn test_data_file_as_command_gets_hint() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .arg("jira_export.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("gitxjira reconcile --catalog"));
}

#[cfg(unix)]
#[test]
fn test_non_utf8_data_file_gets_hint() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .arg(OsStr::from_bytes(b"export_\xff.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("gitxjira reconcile --catalog"));
}

#[test]
fn test_reconcile_requires_catalog_or_jql() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .arg("reconcile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Either --catalog or --jql must be specified"));
}

#[test]
fn test_reconcile_rejects_catalog_with_jql() {
    let tmp = TempDir::new().expect("tmp");
    gitxjira(tmp.path())
        .args(["reconcile", "--catalog", "x.csv", "--jql", "project = ABC"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_reconcile_requires_credentials() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("gitxjira.toml"), "[repos]\n\"PRJ/policy\" = \"PC\"\n")
        .expect("write config");
    fs::write(tmp.path().join("issues.csv"), "Key,Summary,Issue Type\nABC-1,s,Bug\n")
        .expect("write catalog");

    gitxjira(tmp.path())
        .args(["reconcile", "--catalog", "issues.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BITBUCKET_EMAIL, BITBUCKET_TOKEN"));
}

fn ms(y: i32, m: u32, d: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("date")
        .and_utc()
        .timestamp_millis()
}

fn spawn_bitbucket() -> String {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind test server");
    let port = server.server_addr().to_ip().expect("ip listener").port();
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let values = if request.url().contains("develop") {
                json!([
                    {"id": "d1", "message": "ABC-1 rating fix", "authorTimestamp": ms(2025, 3, 20)},
                    {"id": "d2", "message": "tidy imports", "authorTimestamp": ms(2025, 3, 21)}
                ])
            } else {
                json!([])
            };
            let body = json!({"values": values, "isLastPage": true}).to_string();
            let _ = request.respond(tiny_http::Response::from_string(body));
        }
    });
    format!("http://127.0.0.1:{port}/rest/api/1.0")
}

#[test]
fn test_reconcile_end_to_end_writes_reports() {
    let tmp = TempDir::new().expect("tmp");
    let base = spawn_bitbucket();
    fs::write(
        tmp.path().join("gitxjira.toml"),
        format!(
            "fix_version = 'Mobilitas 2025.04.18'\nbitbucket_base_url = '{base}'\n\
             release_branch = 'release/r-51.0'\n\n[repos]\n\"PRJ/policy\" = \"PC\"\n"
        ),
    )
    .expect("write config");
    fs::write(
        tmp.path().join("issues.csv"),
        "Issue key,Summary,Issue Type,Components,Fix versions\n\
         ABC-1,Rating,Bug,PC,Mobilitas 2025.04.18\n\
         ABC-2,Billing,Story,BC,Mobilitas 2025.04.18\n",
    )
    .expect("write catalog");
    fs::write(tmp.path().join(".env"), "BITBUCKET_EMAIL=dev@example.com\nBITBUCKET_TOKEN=tok\n")
        .expect("write .env");

    gitxjira(tmp.path())
        .args(["reconcile", "--catalog", "issues.csv", "--no-timestamp", "--output-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Matches:         1"))
        .stdout(predicate::str::contains("Missing from git: 1"))
        .stdout(predicate::str::contains("Orphan commits:  1"));

    let out = tmp.path().join("out");
    let report: Value = serde_json::from_str(
        &fs::read_to_string(out.join("gitxjira_report.json")).expect("report"),
    )
    .expect("json");
    assert_eq!(report["matches"]["PC"][0]["Issue Key"], "ABC-1");
    assert_eq!(report["matches"]["PC"][0]["Commit Hash"], "d1");
    assert_eq!(report["missing"][0]["Issue Key"], "ABC-2");
    assert_eq!(report["missing"][0]["Missing From"], "Git");

    assert!(out.join("gitxjira_report_PC.csv").exists());
    assert!(out.join("gitxjira_report_missing_issues.csv").exists());
    assert!(out.join("gitxjira_report_orphan_commits.csv").exists());
}
