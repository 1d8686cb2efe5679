// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use capq_core::{CaptureId, CaptureService, Delivery};

use crate::error::Result;

use super::resolve;

pub async fn run<D: Delivery>(service: &CaptureService<D>, ids: &[String]) -> Result<()> {
    for id in run_impl(service, ids).await? {
        println!("Removed {id}");
    }
    Ok(())
}

/// Remove every listed capture. All IDs are resolved before anything is
/// removed, so one bad ID leaves the queue untouched.
pub(crate) async fn run_impl<D: Delivery>(
    service: &CaptureService<D>,
    ids: &[String],
) -> Result<Vec<CaptureId>> {
    let mut resolved = Vec::with_capacity(ids.len());
    for raw in ids {
        let record = resolve(service, raw).await?;
        if !resolved.contains(&record.id) {
            resolved.push(record.id);
        }
    }

    for id in &resolved {
        service.remove(id).await;
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "remove_tests.rs"]
mod tests;
