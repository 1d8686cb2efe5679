// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

fn write_config(temp: &TempDir, content: &str) -> PathBuf {
    let path = temp.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn missing_file_gives_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.remote.url, "http://localhost:8000/api/");
    assert_eq!(config.remote.timeout_secs, 30);
    assert_eq!(config.remote.probe_interval_secs, 5);
    assert_eq!(config.sync.max_retries, 3);
    assert_eq!(config.sync.debounce_ms, 1000);
    assert_eq!(config.storage.backend, BackendMode::Auto);
    assert_eq!(config.storage.dir, None);
}

#[test]
fn partial_file_fills_defaults() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
[remote]
url = "https://captures.example.com/v1"

[sync]
max_retries = 5

[storage]
backend = "flat"
dir = "/var/lib/capq"
"#,
    );

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.remote.url, "https://captures.example.com/v1");
    assert_eq!(config.remote.timeout_secs, 30);
    assert_eq!(config.sync.max_retries, 5);
    assert_eq!(config.sync.debounce_ms, 1000);
    assert_eq!(config.storage.backend, BackendMode::Flat);
    assert_eq!(config.storage.dir, Some(PathBuf::from("/var/lib/capq")));
}

#[test]
fn unknown_keys_are_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[remote]\nendpoint = \"x\"\n");

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse"));
}

#[test]
fn invalid_backend_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[storage]\nbackend = \"indexeddb\"\n");

    assert!(Config::load_from(&path).is_err());
}

#[yare::parameterized(
    not_a_url = { "not a url" },
    ftp = { "ftp://example.com/" },
)]
fn bad_remote_url(url: &str) {
    let mut config = Config::default();
    config.remote.url = url.to_string();
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut config = Config::default();
    config.remote.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[yare::parameterized(
    trailing_slash = { "http://host:8000/api/", "http://host:8000/api/" },
    no_trailing_slash = { "http://host:8000/api", "http://host:8000/api/" },
    root = { "https://host", "https://host/" },
)]
fn remote_url_is_a_directory(input: &str, expected: &str) {
    let mut config = Config::default();
    config.remote.url = input.to_string();
    assert_eq!(config.remote_url().unwrap().as_str(), expected);
}

#[test]
fn service_options_follow_sync_section() {
    let mut config = Config::default();
    config.sync.max_retries = 7;
    config.sync.debounce_ms = 250;

    let options = config.service_options(true);

    assert_eq!(options.max_retries, 7);
    assert_eq!(options.debounce, Duration::from_millis(250));
    assert!(options.online);
}

#[test]
fn round_trips_through_toml() {
    let mut config = Config::default();
    config.storage.backend = BackendMode::Flat;
    config.sync.max_retries = 4;

    let text = config.to_toml().unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();

    assert_eq!(parsed, config);
    assert!(text.contains("backend = \"flat\""));
}

#[yare::parameterized(
    explicit_wins = {
        Some("/explicit"), Some("/env"), Some("/xdg"), Some("/home/u"), "/explicit"
    },
    env_next = { None, Some("/env"), Some("/xdg"), Some("/home/u"), "/env" },
    xdg_next = { None, None, Some("/xdg"), Some("/home/u"), "/xdg/capq" },
    home_last = { None, None, None, Some("/home/u"), "/home/u/.local/state/capq" },
)]
fn state_dir_resolution(
    explicit: Option<&str>,
    env_dir: Option<&str>,
    xdg: Option<&str>,
    home: Option<&str>,
    expected: &str,
) {
    let resolved = resolve_state_dir(
        explicit.map(PathBuf::from),
        env_dir.map(PathBuf::from),
        xdg.map(PathBuf::from),
        home.map(PathBuf::from),
    );
    assert_eq!(resolved, Some(PathBuf::from(expected)));
}

#[test]
fn state_dir_unresolvable() {
    assert_eq!(resolve_state_dir(None, None, None, None), None);
}
