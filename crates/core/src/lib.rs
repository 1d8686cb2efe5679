// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! capq-core: offline capture queue and sync engine.
//!
//! Captures (text notes/ideas/tasks and voice recordings) are persisted
//! locally the moment they are taken and delivered to a remote service once
//! connectivity allows. The remote side is abstracted by [`Delivery`].

pub mod capture;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod network;
pub mod queue;
pub mod scheduler;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use capture::{
    CaptureId, CaptureKind, CapturePatch, CapturePayload, CaptureStatus, QueuedCapture,
    TextCategory, TextPayload, VoiceMetadata, MAX_RETRY_COUNT,
};
pub use delivery::{Delivery, DeliveryError, DeliveryResult};
pub use engine::{SyncEngine, SyncFailure, SyncReport, MISSING_AUDIO_ERROR};
pub use error::{Error, Result};
pub use network::{NetworkState, Transition};
pub use queue::QueueManager;
pub use scheduler::{SyncScheduler, DEFAULT_DEBOUNCE};
pub use service::{CaptureService, ServiceOptions};
pub use store::{BackendMode, DurableBackend, FlatFileBackend, IndexedBackend, Store};
