// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use capq_core::{CaptureService, Delivery, SyncReport};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::display::format_report;
use crate::error::Result;

use super::print_json;

#[derive(Serialize)]
struct SyncOutputJson<'a> {
    online: bool,
    #[serde(flatten)]
    report: &'a SyncReport,
    remaining: usize,
}

pub async fn run<D: Delivery>(service: &CaptureService<D>, output: OutputFormat) -> Result<()> {
    let report = run_impl(service).await;
    let remaining = service.get_all().await.len();

    match output {
        OutputFormat::Text => {
            if !service.is_online() {
                println!("offline: {remaining} capture(s) waiting");
            } else {
                println!("{}", format_report(&report));
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&SyncOutputJson {
            online: service.is_online(),
            report: &report,
            remaining,
        }),
    }
}

/// One sync run. Offline, this is a no-op with an empty report.
pub(crate) async fn run_impl<D: Delivery>(service: &CaptureService<D>) -> SyncReport {
    service.run_sync().await
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
