// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: delivers eligible captures one at a time.
//!
//! A run snapshots the eligible records, then for each one re-reads it,
//! marks it `syncing`, attempts delivery, and either removes it (success)
//! or records the failure. A record removed while the run is in flight is
//! skipped and never written back. One record failing never aborts the run.
//! At most one run is active per engine; an overlapping call returns an
//! empty report at once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::capture::{CaptureId, CapturePatch, CapturePayload, CaptureStatus, QueuedCapture};
use crate::delivery::Delivery;
use crate::network::NetworkState;
use crate::queue::QueueManager;

/// Error recorded for a voice capture that has no audio attached.
pub const MISSING_AUDIO_ERROR: &str = "voice capture is missing audio data";

/// Per-record failure from a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub id: CaptureId,
    pub error: String,
}

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
    pub errors: Vec<SyncFailure>,
}

impl SyncReport {
    /// True for the report of a skipped run or a run with nothing to do.
    pub fn is_empty(&self) -> bool {
        self.synced == 0 && self.failed == 0 && self.errors.is_empty()
    }
}

/// Clears the in-progress flag when the run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SyncEngine<D: Delivery> {
    queue: Arc<QueueManager>,
    delivery: Arc<D>,
    network: Arc<NetworkState>,
    max_retries: u32,
    running: AtomicBool,
    runs: AtomicUsize,
}

impl<D: Delivery> SyncEngine<D> {
    pub fn new(
        queue: Arc<QueueManager>,
        delivery: Arc<D>,
        network: Arc<NetworkState>,
        max_retries: u32,
    ) -> Self {
        SyncEngine {
            queue,
            delivery,
            network,
            max_retries,
            running: AtomicBool::new(false),
            runs: AtomicUsize::new(0),
        }
    }

    pub fn queue(&self) -> &Arc<QueueManager> {
        &self.queue
    }

    pub fn delivery(&self) -> &Arc<D> {
        &self.delivery
    }

    pub fn network(&self) -> &Arc<NetworkState> {
        &self.network
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of runs that got past the offline and in-progress checks.
    pub fn runs_started(&self) -> usize {
        self.runs.load(Ordering::Acquire)
    }

    /// Attempt delivery of every eligible capture.
    ///
    /// Returns an empty report without touching the queue when offline or
    /// when another run holds the guard.
    pub async fn run_sync(&self) -> SyncReport {
        if !self.network.is_online() {
            debug!("sync skipped, network offline");
            return SyncReport::default();
        }
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            debug!("sync skipped, run already in progress");
            return SyncReport::default();
        };
        self.runs.fetch_add(1, Ordering::AcqRel);

        let eligible = self.queue.eligible(self.max_retries).await;
        if eligible.is_empty() {
            debug!("sync run found nothing eligible");
            return SyncReport::default();
        }
        info!(count = eligible.len(), "sync run started");

        let mut report = SyncReport::default();
        for snapshot in eligible {
            let id = snapshot.id;
            // Removed, cleared or requeued since the snapshot: leave it alone.
            let current = match self.queue.get(&id).await {
                Some(r) if r.is_eligible(self.max_retries) => r,
                _ => {
                    debug!(id = %id, "capture changed since snapshot, skipped");
                    continue;
                }
            };
            let Some(record) = self
                .queue
                .update(&id, CapturePatch::status(CaptureStatus::Syncing))
                .await
            else {
                continue;
            };

            match self.deliver(&record).await {
                Ok(()) => {
                    debug!(id = %id, "capture delivered");
                    self.queue.remove(&id).await;
                    report.synced += 1;
                }
                Err(error) => {
                    let retry_count = current.retry_count.saturating_add(1);
                    warn!(
                        id = %id,
                        retry_count,
                        error = %error,
                        "capture delivery failed"
                    );
                    let patch = CapturePatch::status(CaptureStatus::Failed)
                        .with_retry_count(retry_count)
                        .with_last_error(error.clone());
                    match self.queue.update(&id, patch).await {
                        Some(failed) if failed.is_exhausted(self.max_retries) => {
                            warn!(id = %id, "capture out of retries, needs manual action");
                        }
                        Some(_) => {}
                        None => debug!(id = %id, "capture removed during delivery, failure not stored"),
                    }
                    report.failed += 1;
                    report.errors.push(SyncFailure { id, error });
                }
            }
        }

        info!(synced = report.synced, failed = report.failed, "sync run finished");
        report
    }

    async fn deliver(&self, record: &QueuedCapture) -> Result<(), String> {
        match &record.payload {
            CapturePayload::Text(payload) => self
                .delivery
                .deliver_text(payload.clone())
                .await
                .map_err(|e| e.to_string()),
            CapturePayload::Voice(metadata) => {
                let Some(audio) = &record.binary_payload else {
                    return Err(MISSING_AUDIO_ERROR.to_string());
                };
                self.delivery
                    .deliver_voice(metadata.clone(), audio.clone())
                    .await
                    .map_err(|e| e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
