// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use capq_core::{CaptureId, CaptureService, CaptureStatus, Delivery};

use crate::error::{Error, Result};

use super::resolve;

pub async fn run<D: Delivery>(service: &CaptureService<D>, id: &str) -> Result<()> {
    let new_id = run_impl(service, id).await?;
    println!("{new_id}");
    Ok(())
}

/// Replace a capture with a fresh pending copy under a new ID.
///
/// A capture with a delivery in flight cannot be retried.
pub(crate) async fn run_impl<D: Delivery>(
    service: &CaptureService<D>,
    id: &str,
) -> Result<CaptureId> {
    let record = resolve(service, id).await?;
    if record.status == CaptureStatus::Syncing {
        return Err(Error::InvalidInput(format!(
            "{} is being delivered, try again after the sync finishes",
            record.id
        )));
    }
    service
        .requeue(&record.id)
        .await
        .ok_or_else(|| Error::CaptureNotFound(record.id.to_string()))
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
