// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use capq_core::{CaptureService, CaptureStatus, Delivery, QueuedCapture};

use crate::cli::OutputFormat;
use crate::colors;
use crate::display::{format_record_line, RecordView};
use crate::error::Result;

use super::print_json;

pub async fn run<D: Delivery>(
    service: &CaptureService<D>,
    status: Option<CaptureStatus>,
    output: OutputFormat,
) -> Result<()> {
    let records = run_impl(service, status).await;
    let max_retries = service.max_retries();

    match output {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No captures queued.");
                return Ok(());
            }
            let color = colors::should_colorize();
            for record in &records {
                println!("{}", format_record_line(record, max_retries, color));
            }
            Ok(())
        }
        OutputFormat::Json => {
            let views: Vec<RecordView<'_>> = records
                .iter()
                .map(|r| RecordView::new(r, max_retries))
                .collect();
            print_json(&views)
        }
    }
}

/// Queued captures in creation order, optionally filtered by status.
pub(crate) async fn run_impl<D: Delivery>(
    service: &CaptureService<D>,
    status: Option<CaptureStatus>,
) -> Vec<QueuedCapture> {
    let mut records = service.get_all().await;
    if let Some(status) = status {
        records.retain(|r| r.status == status);
    }
    records
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
