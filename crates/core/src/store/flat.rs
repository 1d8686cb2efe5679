// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Flat-file fallback backend.
//!
//! The whole queue lives in one JSON document under a well-known filename.
//! Every operation reads and rewrites the entire blob, which is fine for the
//! handful of captures an interactive user queues up. Writes go to a temp
//! file that is fsynced and renamed over the original.
//!
//! Several `capq` processes may share one state directory, so every
//! read-modify-write holds an exclusive `fs2` lock on a sidecar
//! `<blob>.lock` file. A blob that no longer parses is moved aside to
//! `<blob>.corrupt-<timestamp>` the next time it is written.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use tracing::warn;
use uuid::Uuid;

use super::DurableBackend;
use crate::capture::{CaptureId, QueuedCapture};
use crate::error::{Error, Result};

/// JSON-blob backend. Binary payloads are stored as base64 text.
pub struct FlatFileBackend {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Holds the sidecar lock until dropped.
struct BlobLock(File);

impl Drop for BlobLock {
    fn drop(&mut self) {
        let _ = self.0.unlock();
    }
}

impl FlatFileBackend {
    /// Create a backend for the blob at `path`. The file is created lazily.
    pub fn new(path: PathBuf) -> Self {
        let lock_path = sibling(&path, ".lock");
        FlatFileBackend { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn lock(&self, exclusive: bool) -> Result<BlobLock> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(BlobLock(file))
    }

    fn read(&self) -> Result<Vec<QueuedCapture>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    fn read_shared(&self) -> Result<Vec<QueuedCapture>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let _lock = self.lock(false)?;
        self.read()
    }

    /// Read under the exclusive lock, moving an unparseable blob aside so
    /// the queue can be written again.
    fn read_for_update(&self) -> Result<Vec<QueuedCapture>> {
        match self.read() {
            Err(Error::Json(e)) => {
                let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
                let aside = sibling(&self.path, &format!(".corrupt-{stamp}"));
                fs::rename(&self.path, &aside)?;
                warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "corrupt capture queue moved aside, starting empty"
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn write(&self, records: &[QueuedCapture]) -> Result<()> {
        self.ensure_parent()?;

        let tmp_path = sibling(&self.path, &format!(".{}.tmp", Uuid::now_v7().simple()));
        let json = serde_json::to_string(records)?;

        let result = File::create(&tmp_path).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        });
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }

        Ok(result?)
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("capture-queue"));
    name.push(suffix);
    path.with_file_name(name)
}

impl DurableBackend for FlatFileBackend {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn get_all(&self) -> Result<Vec<QueuedCapture>> {
        self.read_shared()
    }

    fn get(&self, id: &CaptureId) -> Result<Option<QueuedCapture>> {
        Ok(self.read_shared()?.into_iter().find(|r| &r.id == id))
    }

    fn put(&self, record: &QueuedCapture) -> Result<()> {
        let _lock = self.lock(true)?;
        let mut records = self.read_for_update()?;

        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }

        self.write(&records)
    }

    fn delete(&self, id: &CaptureId) -> Result<()> {
        let _lock = self.lock(true)?;
        let mut records = self.read_for_update()?;
        let before = records.len();
        records.retain(|r| &r.id != id);

        if records.len() < before {
            self.write(&records)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _lock = self.lock(true)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "flat_tests.rs"]
mod tests;
