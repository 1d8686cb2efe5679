// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote delivery boundary.
//!
//! The sync engine only knows whether a delivery succeeded and, if not, a
//! message describing why. Response bodies are never interpreted here.

use std::future::Future;
use std::pin::Pin;

use crate::capture::{TextPayload, VoiceMetadata};

/// Error type for delivery attempts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The remote answered with a non-success status.
    #[error("remote rejected capture ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never reached the remote.
    #[error("network error: {0}")]
    Network(String),

    /// The transport gave up waiting.
    #[error("request timed out")]
    Timeout,

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for delivery attempts.
pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;

/// Sends captures to the remote service.
///
/// Text captures route by [`TextPayload::category`]; voice captures carry
/// decoded audio bytes alongside their metadata.
pub trait Delivery: Send + Sync {
    fn deliver_text(
        &self,
        payload: TextPayload,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + '_>>;

    fn deliver_voice(
        &self,
        metadata: VoiceMetadata,
        audio: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + '_>>;
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
