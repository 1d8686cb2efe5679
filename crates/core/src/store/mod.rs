// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for queued captures.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐
//! │    Store    │────►│  IndexedBackend  │  (SQLite, primary)
//! │  (facade)   │     └──────────────────┘
//! │             │     ┌──────────────────┐
//! │             │────►│ FlatFileBackend  │  (JSON blob, fallback)
//! └─────────────┘     └──────────────────┘
//! ```
//!
//! The backend is chosen once at [`Store::initialize`]. Afterwards every
//! operation that fails on the primary is retried against the fallback, and
//! every storage error is logged and absorbed: callers of [`Store`] never see
//! a storage `Err`.

mod flat;
mod indexed;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::capture::{CaptureId, QueuedCapture};
use crate::error::{Error, Result};

pub use flat::FlatFileBackend;
pub use indexed::IndexedBackend;

/// SQLite database filename inside the state directory.
pub const DB_FILE_NAME: &str = "captures.db";
/// Well-known file holding the fallback queue blob.
pub const FALLBACK_FILE_NAME: &str = "capture-queue.json";

/// A persistence backend for [`QueuedCapture`] records.
///
/// Implementations are synchronous; [`Store`] moves each call onto the
/// blocking thread pool. `get_all` must return records in insertion order.
pub trait DurableBackend: Send + Sync {
    /// Short name used in logs and status output.
    fn name(&self) -> &'static str;

    fn get_all(&self) -> Result<Vec<QueuedCapture>>;

    fn get(&self, id: &CaptureId) -> Result<Option<QueuedCapture>>;

    /// Insert or replace the record with the same id.
    fn put(&self, record: &QueuedCapture) -> Result<()>;

    /// Delete by id. Deleting an absent id is not an error.
    fn delete(&self, id: &CaptureId) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Records a sync run may attempt, in insertion order.
    fn get_eligible(&self, max_retries: u32) -> Result<Vec<QueuedCapture>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.is_eligible(max_retries))
            .collect())
    }
}

/// Which backend [`Store::initialize`] should try.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Use SQLite when it opens, the flat file otherwise.
    #[default]
    Auto,
    /// Skip SQLite entirely.
    Flat,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendMode::Auto => "auto",
            BackendMode::Flat => "flat",
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(BackendMode::Auto),
            "flat" => Ok(BackendMode::Flat),
            _ => Err(format!("invalid backend '{s}': expected auto or flat")),
        }
    }
}

/// Backend-agnostic facade over the primary and fallback backends.
pub struct Store {
    /// `None` once the session has settled on the fallback.
    primary: Option<Arc<dyn DurableBackend>>,
    fallback: Arc<dyn DurableBackend>,
    /// Set while the fallback holds records the primary does not.
    fallback_dirty: AtomicBool,
}

impl Store {
    /// Open the store in `dir`, selecting the backend once for the session.
    pub async fn initialize(dir: &Path, mode: BackendMode) -> Store {
        let fallback: Arc<dyn DurableBackend> =
            Arc::new(FlatFileBackend::new(dir.join(FALLBACK_FILE_NAME)));

        let primary = match mode {
            BackendMode::Flat => {
                info!(dir = %dir.display(), "flat-file backend forced by configuration");
                None
            }
            BackendMode::Auto => {
                let path = dir.join(DB_FILE_NAME);
                let opened = tokio::task::spawn_blocking(move || IndexedBackend::open(&path))
                    .await
                    .map_err(|e| Error::BackendUnavailable(e.to_string()))
                    .and_then(|r| r);
                match opened {
                    Ok(backend) => Some(Arc::new(backend) as Arc<dyn DurableBackend>),
                    Err(e) => {
                        warn!(
                            dir = %dir.display(),
                            error = %e,
                            "indexed backend unavailable, using flat-file fallback for this session"
                        );
                        None
                    }
                }
            }
        };

        Self::with_backends(primary, fallback).await
    }

    /// Build a store from explicit backends.
    pub async fn with_backends(
        primary: Option<Arc<dyn DurableBackend>>,
        fallback: Arc<dyn DurableBackend>,
    ) -> Store {
        let store = Store {
            primary,
            fallback,
            fallback_dirty: AtomicBool::new(false),
        };

        // Records stranded in the fallback by an earlier session stay visible.
        if store.primary.is_some() && !store.fallback_records().await.is_empty() {
            info!("fallback holds records from an earlier session, merging on read");
            store.fallback_dirty.store(true, Ordering::Release);
        }

        store
    }

    /// Name of the backend serving this session.
    pub fn backend_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map(|p| p.name())
            .unwrap_or_else(|| self.fallback.name())
    }

    /// True when the session runs on the fallback backend only.
    pub fn is_fallback(&self) -> bool {
        self.primary.is_none()
    }

    fn dirty(&self) -> bool {
        self.fallback_dirty.load(Ordering::Acquire)
    }

    /// Every persisted record, in insertion order. Never fails.
    pub async fn get_all(&self) -> Vec<QueuedCapture> {
        let Some(primary) = &self.primary else {
            return self.fallback_records().await;
        };

        match run_blocking(primary, |b| b.get_all()).await {
            Ok(records) if self.dirty() => merge(records, self.fallback_records().await),
            Ok(records) => records,
            Err(e) => {
                warn!(backend = primary.name(), error = %e, "read failed, serving fallback contents");
                self.fallback_records().await
            }
        }
    }

    /// Records eligible for delivery, in insertion order. Never fails.
    pub async fn get_eligible(&self, max_retries: u32) -> Vec<QueuedCapture> {
        if let Some(primary) = &self.primary {
            if !self.dirty() {
                match run_blocking(primary, move |b| b.get_eligible(max_retries)).await {
                    Ok(records) => return records,
                    Err(e) => {
                        warn!(backend = primary.name(), error = %e, "eligibility scan failed");
                    }
                }
            }
        }

        self.get_all()
            .await
            .into_iter()
            .filter(|r| r.is_eligible(max_retries))
            .collect()
    }

    pub async fn get(&self, id: &CaptureId) -> Option<QueuedCapture> {
        if let Some(primary) = &self.primary {
            let key = id.clone();
            match run_blocking(primary, move |b| b.get(&key)).await {
                Ok(Some(record)) => return Some(record),
                Ok(None) if !self.dirty() => return None,
                Ok(None) => {}
                Err(e) => {
                    warn!(backend = primary.name(), id = %id, error = %e, "lookup failed, trying fallback");
                }
            }
        }

        let key = id.clone();
        run_blocking(&self.fallback, move |b| b.get(&key))
            .await
            .unwrap_or_else(|e| {
                warn!(id = %id, error = %e, "fallback lookup failed");
                None
            })
    }

    /// Upsert `record`. Returns whether any backend accepted the write.
    pub async fn put(&self, record: &QueuedCapture) -> bool {
        if let Some(primary) = &self.primary {
            let copy = record.clone();
            match run_blocking(primary, move |b| b.put(&copy)).await {
                Ok(()) => {
                    if self.dirty() {
                        // Drop any stale fallback copy so reads see one version.
                        let key = record.id.clone();
                        if let Err(e) = run_blocking(&self.fallback, move |b| b.delete(&key)).await
                        {
                            debug!(id = %record.id, error = %e, "could not drop stale fallback copy");
                        }
                    }
                    return true;
                }
                Err(e) => {
                    warn!(
                        backend = primary.name(),
                        id = %record.id,
                        error = %e,
                        "write failed, writing to fallback"
                    );
                }
            }
        }

        let copy = record.clone();
        match run_blocking(&self.fallback, move |b| b.put(&copy)).await {
            Ok(()) => {
                if self.primary.is_some() {
                    self.fallback_dirty.store(true, Ordering::Release);
                }
                true
            }
            Err(e) => {
                error!(id = %record.id, error = %e, "fallback write failed, capture not persisted");
                false
            }
        }
    }

    pub async fn delete(&self, id: &CaptureId) {
        let mut use_fallback = self.primary.is_none() || self.dirty();

        if let Some(primary) = &self.primary {
            let key = id.clone();
            if let Err(e) = run_blocking(primary, move |b| b.delete(&key)).await {
                warn!(backend = primary.name(), id = %id, error = %e, "delete failed, trying fallback");
                use_fallback = true;
            }
        }

        if use_fallback {
            let key = id.clone();
            if let Err(e) = run_blocking(&self.fallback, move |b| b.delete(&key)).await {
                warn!(id = %id, error = %e, "fallback delete failed");
            }
        }
    }

    pub async fn clear(&self) {
        if let Some(primary) = &self.primary {
            if let Err(e) = run_blocking(primary, |b| b.clear()).await {
                warn!(backend = primary.name(), error = %e, "clear failed");
            }
        }

        match run_blocking(&self.fallback, |b| b.clear()).await {
            Ok(()) => self.fallback_dirty.store(false, Ordering::Release),
            Err(e) => warn!(error = %e, "fallback clear failed"),
        }
    }

    async fn fallback_records(&self) -> Vec<QueuedCapture> {
        run_blocking(&self.fallback, |b| b.get_all())
            .await
            .unwrap_or_else(|e| {
                warn!(backend = self.fallback.name(), error = %e, "fallback read failed, treating queue as empty");
                Vec::new()
            })
    }
}

/// Append fallback-only records to the primary's, keeping capture order.
fn merge(mut primary: Vec<QueuedCapture>, fallback: Vec<QueuedCapture>) -> Vec<QueuedCapture> {
    let before = primary.len();
    for record in fallback {
        if !primary.iter().any(|p| p.id == record.id) {
            primary.push(record);
        }
    }
    if primary.len() > before {
        primary.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }
    primary
}

/// Run a backend call on the blocking pool.
async fn run_blocking<T, F>(backend: &Arc<dyn DurableBackend>, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn DurableBackend) -> Result<T> + Send + 'static,
{
    let backend = Arc::clone(backend);
    tokio::task::spawn_blocking(move || op(backend.as_ref()))
        .await
        .map_err(|e| Error::BackendUnavailable(format!("storage task failed: {e}")))?
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
