// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests for `capq sync` and `add --now` against a local HTTP stub.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Minimal HTTP server answering every request with `status`.
/// Records each request line (`POST /api/notes HTTP/1.1`).
struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    fn start(status: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let request = read_request(&mut stream);
                // Connectivity probes connect and hang up without a request.
                if request.is_empty() {
                    continue;
                }
                let line = request.lines().next().unwrap_or_default().to_string();
                seen.lock().unwrap().push(line);
                let response =
                    format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                let _ = stream.write_all(response.as_bytes());
            }
        });

        StubServer { url, requests }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let headers = text[..end].to_ascii_lowercase();
            let expected = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + expected {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn capq(temp: &TempDir, url: &str) -> Command {
    let config = temp.path().join("config.toml");
    std::fs::write(
        &config,
        format!("[remote]\nurl = \"{url}\"\ntimeout_secs = 5\n"),
    )
    .unwrap();
    let mut cmd = cargo_bin_cmd!("capq");
    cmd.env("CAPQ_CONFIG", &config)
        .env("CAPQ_STATE_DIR", temp.path().join("state"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn queued(temp: &TempDir, url: &str) -> Vec<serde_json::Value> {
    let output = capq(temp, url).args(["list", "-o", "json"]).output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

const OFFLINE: &str = "http://127.0.0.1:1/api/";

#[test]
fn offline_sync_leaves_queue() {
    let temp = TempDir::new().unwrap();
    capq(&temp, OFFLINE).args(["add", "a"]).assert().success();

    capq(&temp, OFFLINE)
        .arg("sync")
        .assert()
        .success()
        .stdout("offline: 1 capture(s) waiting\n");

    assert_eq!(queued(&temp, OFFLINE).len(), 1);
}

#[test]
fn captures_made_offline_sync_in_order_once_online() {
    let temp = TempDir::new().unwrap();
    capq(&temp, OFFLINE)
        .args(["add", "first", "-c", "idea"])
        .assert()
        .success();
    capq(&temp, OFFLINE)
        .args(["add", "second", "-c", "task"])
        .assert()
        .success();
    let voice = temp.path().join("memo.wav");
    std::fs::write(&voice, b"RIFFDATA").unwrap();
    capq(&temp, OFFLINE).arg("voice").arg(&voice).assert().success();

    let server = StubServer::start("201 Created");
    capq(&temp, &server.url)
        .arg("sync")
        .assert()
        .success()
        .stdout("synced 3, failed 0\n");

    assert_eq!(
        server.requests(),
        vec![
            "POST /api/ideas HTTP/1.1",
            "POST /api/tasks HTTP/1.1",
            "POST /api/voice HTTP/1.1",
        ]
    );
    assert!(queued(&temp, &server.url).is_empty());
}

#[test]
fn rejected_capture_is_kept_with_error() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start("500 Internal Server Error");
    capq(&temp, OFFLINE).args(["add", "boom"]).assert().success();

    capq(&temp, &server.url)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("synced 0, failed 1"))
        .stdout(predicate::str::contains("remote rejected capture (500)"));

    let records = queued(&temp, &server.url);
    assert_eq!(records[0]["status"], "failed");
    assert_eq!(records[0]["retry_count"], 1);
}

#[test]
fn retries_stop_at_the_limit() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start("503 Service Unavailable");
    capq(&temp, OFFLINE).args(["add", "stubborn"]).assert().success();

    for _ in 0..4 {
        capq(&temp, &server.url).arg("sync").assert().success();
    }

    assert_eq!(server.requests().len(), 3);
    let records = queued(&temp, &server.url);
    assert_eq!(records[0]["retry_count"], 3);
    assert_eq!(records[0]["exhausted"], true);
}

#[test]
fn add_now_delivers_immediately() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start("200 OK");

    capq(&temp, &server.url)
        .args(["add", "right away", "--now"])
        .assert()
        .success()
        .stderr(predicate::str::contains("synced 1, failed 0"));

    assert_eq!(server.requests(), vec!["POST /api/notes HTTP/1.1"]);
    assert!(queued(&temp, &server.url).is_empty());
}

#[test]
fn sync_json_output() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start("201 Created");
    capq(&temp, OFFLINE).args(["add", "x"]).assert().success();

    let output = capq(&temp, &server.url)
        .args(["sync", "-o", "json"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(report["online"], true);
    assert_eq!(report["synced"], 1);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["remaining"], 0);
}
