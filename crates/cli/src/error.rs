// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the capqrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("capture not found: {0}")]
    CaptureNotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot determine state directory\n  hint: set CAPQ_STATE_DIR or [storage].dir in the config file")]
    NoStateDir,

    #[error("another watcher is already running for {0}")]
    WatchLocked(String),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Core(#[from] capq_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for capqrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
