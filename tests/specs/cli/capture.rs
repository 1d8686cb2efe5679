// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests for `capq add` and `capq voice`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

/// `capq` isolated in `temp`: private state dir and an unreachable remote.
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

fn list_json(temp: &TempDir) -> Vec<serde_json::Value> {
    let output = capq(temp).args(["list", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// add
// =============================================================================

#[test]
fn add_prints_capture_id() {
    let temp = TempDir::new().unwrap();

    capq(&temp)
        .args(["add", "buy milk"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^cap-[0-9a-f-]{36}\n$").unwrap());
}

#[test]
fn add_persists_across_invocations() {
    let temp = TempDir::new().unwrap();
    capq(&temp).args(["add", "first"]).assert().success();
    capq(&temp).args(["add", "second"]).assert().success();

    let records = list_json(&temp);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["payload"]["content"], "first");
    assert_eq!(records[1]["payload"]["content"], "second");
    assert_eq!(records[0]["status"], "pending");
    assert_eq!(records[0]["retry_count"], 0);
}

#[test]
fn add_with_metadata() {
    let temp = TempDir::new().unwrap();
    capq(&temp)
        .args([
            "add", "ship v2", "-t", "Release", "--tag", "work,q3", "-c", "task",
        ])
        .assert()
        .success();

    let records = list_json(&temp);

    let payload = &records[0]["payload"];
    assert_eq!(payload["title"], "Release");
    assert_eq!(payload["tags"], serde_json::json!(["work", "q3"]));
    assert_eq!(payload["category"], "task");
}

#[parameterized(
    empty = { "" },
    blank = { "   " },
)]
fn add_rejects_blank_content(content: &str) {
    let temp = TempDir::new().unwrap();
    capq(&temp).args(["add", content]).assert().failure();
    assert!(list_json(&temp).is_empty());
}

#[test]
fn add_now_while_offline_keeps_capture() {
    let temp = TempDir::new().unwrap();

    capq(&temp)
        .args(["add", "later", "--now"])
        .assert()
        .success()
        .stderr(predicate::str::contains("offline"));

    assert_eq!(list_json(&temp).len(), 1);
}

#[test]
fn add_json_output_is_the_record() {
    let temp = TempDir::new().unwrap();
    let output = capq(&temp)
        .args(["add", "json me", "-o", "json"])
        .output()
        .unwrap();

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["kind"], "text");
    assert_eq!(record["status"], "pending");
    assert_eq!(record["payload"]["content"], "json me");
}

// =============================================================================
// voice
// =============================================================================

#[test]
fn voice_queues_audio_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("memo.wav");
    std::fs::write(&file, b"RIFF0000WAVE").unwrap();

    capq(&temp)
        .arg("voice")
        .arg(&file)
        .args(["--duration", "1.5", "--transcription", "hello"])
        .assert()
        .success();

    let records = list_json(&temp);
    assert_eq!(records[0]["kind"], "voice");
    assert_eq!(records[0]["audio_bytes"], 12);
    assert_eq!(records[0]["payload"]["filename"], "memo.wav");
    assert_eq!(records[0]["payload"]["mime_type"], "audio/wav");
}

#[test]
fn voice_missing_file_fails() {
    let temp = TempDir::new().unwrap();

    capq(&temp)
        .args(["voice", "does-not-exist.wav"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn voice_empty_file_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("empty.wav");
    std::fs::write(&file, b"").unwrap();

    capq(&temp)
        .arg("voice")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("audio file is empty"));
}
