// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod clear;
pub mod config;
pub mod list;
pub mod remove;
pub mod retry;
pub mod show;
pub mod status;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod voice;
pub mod watch;

use capq_core::{CaptureId, CaptureService, Delivery, QueuedCapture, Store};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::HttpDelivery;

/// Open the queue in the configured state directory with HTTP delivery.
pub async fn open_service(config: &Config, online: bool) -> Result<CaptureService<HttpDelivery>> {
    let state_dir = config.state_dir()?;
    let delivery = HttpDelivery::new(config.remote_url()?, config.request_timeout())?;
    let store = Store::initialize(&state_dir, config.storage.backend).await;
    debug!(dir = %state_dir.display(), backend = store.backend_name(), online, "opened queue");
    Ok(CaptureService::start(store, delivery, config.service_options(online)).await)
}

/// Parse `raw` as a capture ID and load the record.
pub(crate) async fn resolve<D: Delivery>(
    service: &CaptureService<D>,
    raw: &str,
) -> Result<QueuedCapture> {
    let id = CaptureId::parse(raw.trim())?;
    service
        .get(&id)
        .await
        .ok_or_else(|| Error::CaptureNotFound(id.to_string()))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
