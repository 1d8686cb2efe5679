// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests for queue inspection and remediation:
//! `list`, `show`, `status`, `remove`, `clear` and `retry`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

fn capq(temp: &TempDir) -> Command {
    let config = temp.path().join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "[remote]\nurl = \"http://127.0.0.1:1/api/\"\n").unwrap();
    }
    let mut cmd = cargo_bin_cmd!("capq");
    cmd.env("CAPQ_CONFIG", &config)
        .env("CAPQ_STATE_DIR", temp.path().join("state"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn add(temp: &TempDir, content: &str) -> String {
    let output = capq(temp).args(["add", content]).output().unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn ids(temp: &TempDir) -> Vec<String> {
    let output = capq(temp).args(["list", "-o", "json"]).output().unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// list / show
// =============================================================================

#[test]
fn list_empty_queue() {
    let temp = TempDir::new().unwrap();
    capq(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout("No captures queued.\n");
}

#[test]
fn list_shows_one_line_per_capture() {
    let temp = TempDir::new().unwrap();
    let a = add(&temp, "alpha");
    let b = add(&temp, "beta");

    let output = capq(&temp).arg("list").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&a));
    assert!(lines[0].contains("pending"));
    assert!(lines[0].ends_with("alpha"));
    assert!(lines[1].starts_with(&b));
    assert!(!stdout.contains("\x1b["), "NO_COLOR output must be plain");
}

#[parameterized(
    pending = { "pending", 1 },
    failed = { "failed", 0 },
)]
fn list_filters_by_status(status: &str, expected: usize) {
    let temp = TempDir::new().unwrap();
    add(&temp, "x");

    let output = capq(&temp)
        .args(["list", "-s", status, "-o", "json"])
        .output()
        .unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(records.len(), expected);
}

#[test]
fn show_displays_details() {
    let temp = TempDir::new().unwrap();
    let id = add(&temp, "remember the milk");

    capq(&temp)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("{id}\n")))
        .stdout(predicate::str::contains("Status: pending"))
        .stdout(predicate::str::contains("Retries: 0/3"))
        .stdout(predicate::str::contains("  remember the milk"));
}

#[test]
fn show_unknown_id_fails() {
    let temp = TempDir::new().unwrap();
    capq(&temp)
        .args(["show", "cap-0190b8a2-7c3e-7000-8000-000000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("capture not found"));
}

#[test]
fn show_malformed_id_fails() {
    let temp = TempDir::new().unwrap();
    capq(&temp)
        .args(["show", "not-an-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid capture id"));
}

// =============================================================================
// status
// =============================================================================

#[test]
fn status_reports_offline_and_counts() {
    let temp = TempDir::new().unwrap();
    add(&temp, "a");
    add(&temp, "b");

    capq(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(offline)"))
        .stdout(predicate::str::contains("Queued: 2"));
}

#[test]
fn status_json() {
    let temp = TempDir::new().unwrap();
    add(&temp, "a");

    let output = capq(&temp).args(["status", "-o", "json"]).output().unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(status["online"], false);
    assert_eq!(status["queued"], 1);
    assert_eq!(status["max_retries"], 3);
    assert_eq!(status["remote"], "http://127.0.0.1:1/api/");
}

// =============================================================================
// remove / clear / retry
// =============================================================================

#[test]
fn remove_drops_captures() {
    let temp = TempDir::new().unwrap();
    let a = add(&temp, "a");
    let b = add(&temp, "b");

    capq(&temp)
        .args(["remove", &a])
        .assert()
        .success()
        .stdout(format!("Removed {a}\n"));

    assert_eq!(ids(&temp), vec![b]);
}

#[test]
fn remove_with_unknown_id_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let a = add(&temp, "a");

    capq(&temp)
        .args(["remove", &a, "cap-0190b8a2-7c3e-7000-8000-000000000000"])
        .assert()
        .failure();

    assert_eq!(ids(&temp), vec![a]);
}

#[test]
fn clear_empties_queue() {
    let temp = TempDir::new().unwrap();
    add(&temp, "a");
    add(&temp, "b");

    capq(&temp)
        .arg("clear")
        .assert()
        .success()
        .stdout("Cleared 2 captures\n");

    assert!(ids(&temp).is_empty());
}

#[test]
fn clear_failed_keeps_pending() {
    let temp = TempDir::new().unwrap();
    let a = add(&temp, "a");

    capq(&temp)
        .args(["clear", "--failed"])
        .assert()
        .success()
        .stdout("Cleared 0 captures\n");

    assert_eq!(ids(&temp), vec![a]);
}

#[test]
fn retry_issues_new_id() {
    let temp = TempDir::new().unwrap();
    let old = add(&temp, "again");

    let output = capq(&temp).args(["retry", &old]).output().unwrap();
    assert!(output.status.success());
    let new = String::from_utf8_lossy(&output.stdout).trim().to_string();

    assert_ne!(new, old);
    assert_eq!(ids(&temp), vec![new]);
}
