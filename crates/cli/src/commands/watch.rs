// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running sync loop.
//!
//! Probes the remote every interval and feeds the result to the service,
//! which syncs on the offline to online edge. Captures queued by other
//! `capq` processes are picked up on the next probe while online.

use std::fs;
use std::path::Path;
use std::time::Duration;

use capq_core::{CaptureService, CaptureStatus, Delivery, Transition};
use fs2::FileExt;
use reqwest::Url;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::display::format_report;
use crate::error::{Error, Result};
use crate::probe::{is_reachable, PROBE_TIMEOUT};

/// Held for the life of a watcher; a second watcher on the same state
/// directory fails fast.
pub const LOCK_FILE_NAME: &str = "watch.lock";

pub fn acquire_lock(state_dir: &Path) -> Result<fs::File> {
    fs::create_dir_all(state_dir)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(state_dir.join(LOCK_FILE_NAME))?;
    file.try_lock_exclusive()
        .map_err(|_| Error::WatchLocked(state_dir.display().to_string()))?;
    Ok(file)
}

pub async fn run<D: Delivery>(
    service: &CaptureService<D>,
    remote: &Url,
    interval: Duration,
    state_dir: &Path,
) -> Result<()> {
    let _lock = acquire_lock(state_dir)?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    println!("watching {remote} every {}s (Ctrl-C to stop)", interval.as_secs());
    run_until(service, remote, interval, shutdown).await;
    println!("stopped");
    Ok(())
}

/// Probe and print sync reports until `shutdown` fires.
pub(crate) async fn run_until<D: Delivery>(
    service: &CaptureService<D>,
    remote: &Url,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut reports = service.subscribe();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let probe_timeout = PROBE_TIMEOUT.min(interval);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let online = is_reachable(remote, probe_timeout).await;
                match service.set_online(online) {
                    Transition::WentOnline => {
                        info!(remote = %remote, "remote reachable");
                        println!("online");
                    }
                    Transition::WentOffline => {
                        info!(remote = %remote, "remote unreachable");
                        println!("offline");
                    }
                    Transition::Unchanged if online && !service.is_syncing() => {
                        if has_unattempted(service).await {
                            service.request_sync();
                        }
                    }
                    Transition::Unchanged => {}
                }
            }
            report = reports.recv() => match report {
                Ok(report) if !report.is_empty() => println!("{}", format_report(&report)),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => warn!(missed, "sync reports dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    service.shutdown();
}

/// Whether the store holds captures no run has attempted yet.
async fn has_unattempted<D: Delivery>(service: &CaptureService<D>) -> bool {
    service
        .get_all()
        .await
        .iter()
        .any(|r| r.status == CaptureStatus::Pending)
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
