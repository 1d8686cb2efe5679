// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! One-shot commands log to stderr at `warn` (`debug` with `--verbose`).
//! `capq watch` appends to `<state_dir>/capq.log` at `info`, falling back
//! to stderr when the file cannot be opened. `RUST_LOG` overrides both.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

/// Log file written by `capq watch`.
pub const LOG_FILE_NAME: &str = "capq.log";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn in_state_dir(state_dir: &Path) -> Self {
        LogTarget::File(state_dir.join(LOG_FILE_NAME))
    }
}

/// Default filter directive when `RUST_LOG` is unset.
pub fn default_level(verbose: bool, long_running: bool) -> &'static str {
    match (verbose, long_running) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: &str, target: &LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let LogTarget::File(path) = target {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(path) {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .try_init();
            return;
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
