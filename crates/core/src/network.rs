// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity flag shared by the sync engine and scheduler.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::info;

/// Result of reporting connectivity to [`NetworkState::set_online`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
    Unchanged,
}

/// Online/offline flag with change notification.
pub struct NetworkState {
    online: AtomicBool,
    changes: watch::Sender<bool>,
}

impl NetworkState {
    pub fn new(online: bool) -> Self {
        let (changes, _) = watch::channel(online);
        NetworkState {
            online: AtomicBool::new(online),
            changes,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Record the current connectivity and report whether it flipped.
    pub fn set_online(&self, online: bool) -> Transition {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return Transition::Unchanged;
        }

        self.changes.send_replace(online);
        if online {
            info!("network online");
            Transition::WentOnline
        } else {
            info!("network offline");
            Transition::WentOffline
        }
    }

    /// Receiver that observes every connectivity flip.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.changes.subscribe()
    }
}

impl Default for NetworkState {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
