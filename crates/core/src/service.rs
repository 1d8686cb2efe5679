// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root for the capture queue.
//!
//! [`CaptureService`] owns the queue, engine, network flag and scheduler for
//! one application session. Callers hold it for the life of the process and
//! call [`CaptureService::shutdown`] on exit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

use crate::capture::{
    CaptureId, CapturePatch, CapturePayload, QueuedCapture, TextPayload, VoiceMetadata,
    MAX_RETRY_COUNT,
};
use crate::delivery::Delivery;
use crate::engine::{SyncEngine, SyncReport};
use crate::network::{NetworkState, Transition};
use crate::queue::QueueManager;
use crate::scheduler::{SyncScheduler, DEFAULT_DEBOUNCE};
use crate::store::Store;

/// Tunables for a [`CaptureService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub max_retries: u32,
    pub debounce: Duration,
    /// Connectivity reported by the environment at startup.
    pub online: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServiceOptions {
            max_retries: MAX_RETRY_COUNT,
            debounce: DEFAULT_DEBOUNCE,
            online: false,
        }
    }
}

pub struct CaptureService<D: Delivery + 'static> {
    queue: Arc<QueueManager>,
    engine: Arc<SyncEngine<D>>,
    scheduler: SyncScheduler<D>,
}

impl<D: Delivery + 'static> CaptureService<D> {
    /// Load the queue from `store` and wire up the sync pipeline.
    ///
    /// Starting online with captures already queued arms a sync run.
    pub async fn start(store: Store, delivery: D, options: ServiceOptions) -> Self {
        let queue = Arc::new(QueueManager::open(Arc::new(store)).await);
        let network = Arc::new(NetworkState::new(options.online));
        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&queue),
            Arc::new(delivery),
            network,
            options.max_retries,
        ));
        let scheduler = SyncScheduler::new(Arc::clone(&engine), options.debounce);

        info!(
            backend = queue.store().backend_name(),
            queued = queue.len(),
            online = options.online,
            "capture service started"
        );
        if options.online && !queue.is_empty() {
            scheduler.schedule();
        }

        CaptureService {
            queue,
            engine,
            scheduler,
        }
    }

    /// Queue a capture and return its id at once; delivery happens later.
    pub async fn enqueue(
        &self,
        payload: CapturePayload,
        binary_payload: Option<Vec<u8>>,
    ) -> CaptureId {
        let id = self.queue.enqueue(payload, binary_payload).await;
        self.scheduler.notify_enqueued();
        id
    }

    pub async fn enqueue_text(&self, payload: TextPayload) -> CaptureId {
        self.enqueue(payload.into(), None).await
    }

    pub async fn enqueue_voice(&self, metadata: VoiceMetadata, audio: Option<Vec<u8>>) -> CaptureId {
        self.enqueue(metadata.into(), audio).await
    }

    /// Run a sync pass now, independent of the scheduler.
    pub async fn run_sync(&self) -> SyncReport {
        self.engine.run_sync().await
    }

    pub async fn get_all(&self) -> Vec<QueuedCapture> {
        self.queue.get_all().await
    }

    pub async fn get(&self, id: &CaptureId) -> Option<QueuedCapture> {
        self.queue.get(id).await
    }

    pub async fn remove(&self, id: &CaptureId) {
        self.queue.remove(id).await;
    }

    pub async fn clear(&self) {
        self.queue.clear().await;
    }

    pub async fn update(&self, id: &CaptureId, patch: CapturePatch) -> Option<QueuedCapture> {
        self.queue.update(id, patch).await
    }

    /// Give a capture a fresh id and retry budget, then arm a sync.
    pub async fn requeue(&self, id: &CaptureId) -> Option<CaptureId> {
        let new_id = self.queue.requeue(id).await?;
        self.scheduler.notify_enqueued();
        Some(new_id)
    }

    /// Arm a debounced run if online and idle. Used when captures reach
    /// the store from outside this service.
    pub fn request_sync(&self) {
        self.scheduler.notify_enqueued();
    }

    /// Report connectivity; see [`SyncScheduler::on_network_change`].
    pub fn set_online(&self, online: bool) -> Transition {
        self.scheduler.on_network_change(online)
    }

    pub fn is_online(&self) -> bool {
        self.engine.network().is_online()
    }

    pub fn is_syncing(&self) -> bool {
        self.engine.is_running()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    pub fn pending_items(&self) -> Vec<QueuedCapture> {
        self.queue.pending_items()
    }

    pub fn max_retries(&self) -> u32 {
        self.engine.max_retries()
    }

    pub fn backend_name(&self) -> &'static str {
        self.queue.store().backend_name()
    }

    /// Reports from scheduler-triggered runs.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncReport> {
        self.scheduler.subscribe()
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
