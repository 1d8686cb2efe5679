// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use capq_core::{CaptureService, CaptureStatus, Delivery};

use crate::error::Result;

pub async fn run<D: Delivery>(service: &CaptureService<D>, failed_only: bool) -> Result<()> {
    let count = run_impl(service, failed_only).await;
    let noun = if count == 1 { "capture" } else { "captures" };
    println!("Cleared {count} {noun}");
    Ok(())
}

/// Drop captures without delivering them. Returns how many were dropped.
pub(crate) async fn run_impl<D: Delivery>(service: &CaptureService<D>, failed_only: bool) -> usize {
    if !failed_only {
        let count = service.get_all().await.len();
        service.clear().await;
        return count;
    }

    let failed: Vec<_> = service
        .get_all()
        .await
        .into_iter()
        .filter(|r| r.status == CaptureStatus::Failed)
        .collect();
    for record in &failed {
        service.remove(&record.id).await;
    }
    failed.len()
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
