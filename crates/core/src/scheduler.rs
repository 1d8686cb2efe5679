// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Debounced sync scheduling.
//!
//! Connectivity flips and enqueues call into [`SyncScheduler`], which keeps
//! at most one timer armed: scheduling again cancels the armed timer and
//! starts a fresh one. A timer that has already fired is not affected, so an
//! in-flight run always completes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::delivery::Delivery;
use crate::engine::{SyncEngine, SyncReport};
use crate::network::Transition;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

const REPORT_CHANNEL_CAPACITY: usize = 16;

pub struct SyncScheduler<D: Delivery + 'static> {
    engine: Arc<SyncEngine<D>>,
    debounce: Duration,
    shutdown: CancellationToken,
    armed: Mutex<Option<CancellationToken>>,
    reports: broadcast::Sender<SyncReport>,
}

impl<D: Delivery + 'static> SyncScheduler<D> {
    pub fn new(engine: Arc<SyncEngine<D>>, debounce: Duration) -> Self {
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        SyncScheduler {
            engine,
            debounce,
            shutdown: CancellationToken::new(),
            armed: Mutex::new(None),
            reports,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Reports from runs triggered by this scheduler.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncReport> {
        self.reports.subscribe()
    }

    /// Record connectivity; going online with captures queued arms a run.
    pub fn on_network_change(&self, online: bool) -> Transition {
        let transition = self.engine.network().set_online(online);
        if transition == Transition::WentOnline && !self.engine.queue().is_empty() {
            self.schedule();
        }
        transition
    }

    /// Arm a run after an enqueue, if online and no run is active.
    pub fn notify_enqueued(&self) {
        if self.engine.network().is_online() && !self.engine.is_running() {
            self.schedule();
        }
    }

    /// Arm a run after the debounce window, superseding any armed timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }

        let token = self.shutdown.child_token();
        let previous = self
            .armed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let engine = Arc::clone(&self.engine);
        let reports = self.reports.clone();
        let delay = self.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("debounced sync superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    let report = engine.run_sync().await;
                    // No subscribers is fine.
                    let _ = reports.send(report);
                }
            }
        });
    }

    /// Cancel any armed timer and refuse further scheduling.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("sync scheduler shutting down");
        }
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<D: Delivery + 'static> Drop for SyncScheduler<D> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
