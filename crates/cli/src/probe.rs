// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity probe.
//!
//! "Online" means a TCP connection to the remote's host and port opens
//! within the probe timeout. No request is sent.

use std::time::Duration;

use reqwest::Url;
use tokio::net::TcpStream;
use tracing::debug;

/// Upper bound on one probe attempt.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// `host:port` for `url`, using the scheme's default port when absent.
pub fn probe_target(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    if host.contains(':') {
        Some(format!("[{host}]:{port}"))
    } else {
        Some(format!("{host}:{port}"))
    }
}

/// Report whether the remote at `url` accepts connections.
pub async fn is_reachable(url: &Url, timeout: Duration) -> bool {
    let Some(target) = probe_target(url) else {
        debug!(url = %url, "remote url has no host, treating as offline");
        return false;
    };

    match tokio::time::timeout(timeout, TcpStream::connect(&target)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!(target = %target, error = %e, "remote unreachable");
            false
        }
        Err(_) => {
            debug!(target = %target, "remote probe timed out");
            false
        }
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
