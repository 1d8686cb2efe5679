// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue manager for offline captures.
//!
//! Every mutation of the queue goes through [`QueueManager`]: it writes to
//! the [`Store`] first and only then updates the in-memory mirror, so the
//! mirror never runs ahead of durable state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::capture::{
    CaptureId, CapturePatch, CapturePayload, CaptureStatus, QueuedCapture,
};
use crate::store::Store;

/// Owner of the capture queue and its in-memory mirror.
pub struct QueueManager {
    store: Arc<Store>,
    mirror: RwLock<Vec<QueuedCapture>>,
}

impl QueueManager {
    /// Load the queue from `store`.
    ///
    /// Records left in `syncing` by an interrupted run go back to `pending`
    /// with their retry count untouched.
    pub async fn open(store: Arc<Store>) -> Self {
        let mut records = store.get_all().await;

        for record in records
            .iter_mut()
            .filter(|r| r.status == CaptureStatus::Syncing)
        {
            info!(id = %record.id, "recovering capture interrupted mid-sync");
            record.status = CaptureStatus::Pending;
            store.put(record).await;
        }

        debug!(count = records.len(), backend = store.backend_name(), "loaded capture queue");

        QueueManager {
            store,
            mirror: RwLock::new(records),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn read_mirror(&self) -> RwLockReadGuard<'_, Vec<QueuedCapture>> {
        self.mirror.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_mirror(&self) -> RwLockWriteGuard<'_, Vec<QueuedCapture>> {
        self.mirror.write().unwrap_or_else(|e| e.into_inner())
    }

    fn mirror_upsert(&self, record: QueuedCapture) {
        let mut mirror = self.write_mirror();
        match mirror.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => mirror.push(record),
        }
    }

    /// Queue a new capture and return its id without waiting for delivery.
    pub async fn enqueue(
        &self,
        payload: CapturePayload,
        binary_payload: Option<Vec<u8>>,
    ) -> CaptureId {
        let record = QueuedCapture::new(payload, binary_payload);
        let id = record.id.clone();

        if !self.store.put(&record).await {
            warn!(id = %id, "capture kept in memory only, storage rejected the write");
        }
        info!(id = %id, kind = %record.kind(), "capture queued");
        self.mirror_upsert(record);

        id
    }

    /// Remove a capture. Removing an unknown id is a no-op.
    pub async fn remove(&self, id: &CaptureId) {
        self.store.delete(id).await;
        self.write_mirror().retain(|r| &r.id != id);
        debug!(id = %id, "capture removed");
    }

    /// Drop every queued capture.
    pub async fn clear(&self) {
        self.store.clear().await;
        self.write_mirror().clear();
        info!("capture queue cleared");
    }

    /// Latest persisted state of a capture (store first, not the mirror).
    pub async fn get(&self, id: &CaptureId) -> Option<QueuedCapture> {
        self.store.get(id).await
    }

    /// All persisted captures in queue order.
    pub async fn get_all(&self) -> Vec<QueuedCapture> {
        self.store.get_all().await
    }

    /// Captures a sync run may attempt, in queue order.
    pub async fn eligible(&self, max_retries: u32) -> Vec<QueuedCapture> {
        self.store.get_eligible(max_retries).await
    }

    /// Shallow-merge `patch` into the stored capture and persist it.
    ///
    /// Returns the merged record, or `None` if the id is unknown.
    pub async fn update(&self, id: &CaptureId, patch: CapturePatch) -> Option<QueuedCapture> {
        let mut record = self.store.get(id).await?;

        if !patch.apply(&mut record) {
            warn!(id = %id, "partial update dropped fields that would break record invariants");
        }

        self.store.put(&record).await;
        self.mirror_upsert(record.clone());
        Some(record)
    }

    /// Re-queue a capture under a fresh id with a clean retry budget.
    ///
    /// The old record is removed; its id is never reused.
    pub async fn requeue(&self, id: &CaptureId) -> Option<CaptureId> {
        let record = self.store.get(id).await?;
        self.remove(id).await;
        let new_id = self.enqueue(record.payload, record.binary_payload).await;
        info!(old_id = %id, new_id = %new_id, "capture re-queued");
        Some(new_id)
    }

    /// Snapshot of the mirror.
    pub fn pending_items(&self) -> Vec<QueuedCapture> {
        self.read_mirror().clone()
    }

    /// Queued captures not currently in flight.
    pub fn pending_count(&self) -> usize {
        self.read_mirror()
            .iter()
            .filter(|r| r.status != CaptureStatus::Syncing)
            .count()
    }

    pub fn len(&self) -> usize {
        self.read_mirror().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_mirror().is_empty()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
