// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for capq-core operations.
//!
//! These errors are internal to the storage layer. The [`Store`](crate::Store)
//! facade and the [`QueueManager`](crate::QueueManager) log and absorb them;
//! they only reach callers through constructors and parsing.

use thiserror::Error;

/// All possible errors that can occur in capq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid capture kind: '{0}'\n  hint: valid kinds are: text, voice")]
    InvalidKind(String),

    #[error("invalid capture status: '{0}'\n  hint: valid statuses are: pending, syncing, failed")]
    InvalidStatus(String),

    #[error("invalid category: '{0}'\n  hint: valid categories are: note, idea, task")]
    InvalidCategory(String),

    #[error("invalid capture id: '{0}'")]
    InvalidId(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// A specialized Result type for capq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
