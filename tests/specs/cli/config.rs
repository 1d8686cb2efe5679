// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests for configuration loading and `capq config`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn capq(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("capq");
    cmd.env("CAPQ_STATE_DIR", temp.path().join("state"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(temp: &TempDir, body: &str) -> std::path::PathBuf {
    let path = temp.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn config_prints_defaults_for_missing_file() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    capq(&temp)
        .env("CAPQ_CONFIG", &missing)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("not found, using defaults"))
        .stdout(predicate::str::contains("url = \"http://localhost:8000/api/\""))
        .stdout(predicate::str::contains("max_retries = 3"));
}

#[test]
fn config_flag_overrides_env() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[sync]\nmax_retries = 7\n");

    capq(&temp)
        .env("CAPQ_CONFIG", temp.path().join("other.toml"))
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("# config: {}", path.display())))
        .stdout(predicate::str::contains("max_retries = 7"));
}

#[test]
fn config_shows_state_dir_from_env() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "");

    capq(&temp)
        .env("CAPQ_CONFIG", &path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "# state dir: {}",
            temp.path().join("state").display()
        )));
}

#[test]
fn unknown_key_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[remote]\nendpoint = \"http://x/\"\n");

    capq(&temp)
        .env("CAPQ_CONFIG", &path)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: config error"));
}

#[test]
fn non_http_remote_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[remote]\nurl = \"ftp://example.com/\"\n");

    capq(&temp)
        .env("CAPQ_CONFIG", &path)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must use http or https"));
}

#[test]
fn storage_dir_in_config_wins() {
    let temp = TempDir::new().unwrap();
    let custom = temp.path().join("custom");
    let path = write_config(
        &temp,
        &format!(
            "[remote]\nurl = \"http://127.0.0.1:1/api/\"\n\n[storage]\ndir = \"{}\"\n",
            custom.display()
        ),
    );

    capq(&temp)
        .env("CAPQ_CONFIG", &path)
        .args(["add", "here"])
        .assert()
        .success();

    assert!(custom.join("captures.db").exists());
    assert!(!temp.path().join("state").exists());
}

#[test]
fn flat_backend_writes_json_file() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        "[remote]\nurl = \"http://127.0.0.1:1/api/\"\n\n[storage]\nbackend = \"flat\"\n",
    );

    capq(&temp)
        .env("CAPQ_CONFIG", &path)
        .args(["add", "flat"])
        .assert()
        .success();
    capq(&temp)
        .env("CAPQ_CONFIG", &path)
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Storage: flat"));

    assert!(temp.path().join("state").join("capture-queue.json").exists());
}
