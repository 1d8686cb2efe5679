// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for the sync pipeline.

#![allow(clippy::unwrap_used)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::capture::{TextPayload, VoiceMetadata};
use crate::delivery::{Delivery, DeliveryError, DeliveryResult};
use crate::queue::QueueManager;
use crate::store::{BackendMode, Store};

/// What a [`MockDelivery`] was asked to send.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Delivered {
    Text(TextPayload),
    Voice(VoiceMetadata, Vec<u8>),
}

/// Mock delivery for testing without a remote.
#[derive(Default)]
pub(crate) struct MockDelivery {
    delivered: Mutex<Vec<Delivered>>,
    failure: Mutex<Option<DeliveryError>>,
    delay: Option<Duration>,
    attempts: AtomicUsize,
}

impl MockDelivery {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every attempt fails with `error`.
    pub(crate) fn failing(error: DeliveryError) -> Self {
        let mock = Self::default();
        mock.set_failure(Some(error));
        mock
    }

    /// Each attempt sleeps before completing.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn set_failure(&self, error: Option<DeliveryError>) {
        *self.failure.lock().unwrap() = error;
    }

    /// Successful deliveries, in order.
    pub(crate) fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().unwrap().clone()
    }

    /// All attempts, successful or not.
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn attempt(&self, item: Delivered) -> DeliveryResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(error) => Err(error),
            None => {
                self.delivered.lock().unwrap().push(item);
                Ok(())
            }
        }
    }
}

impl Delivery for MockDelivery {
    fn deliver_text(
        &self,
        payload: TextPayload,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + '_>> {
        Box::pin(self.attempt(Delivered::Text(payload)))
    }

    fn deliver_voice(
        &self,
        metadata: VoiceMetadata,
        audio: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + '_>> {
        Box::pin(self.attempt(Delivered::Voice(metadata, audio)))
    }
}

/// Queue backed by a fresh store in `dir`.
pub(crate) async fn temp_queue(dir: &std::path::Path) -> Arc<QueueManager> {
    let store = Store::initialize(dir, BackendMode::Auto).await;
    Arc::new(QueueManager::open(Arc::new(store)).await)
}
