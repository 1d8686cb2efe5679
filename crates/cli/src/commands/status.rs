// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use capq_core::{CaptureService, Delivery};

use crate::cli::OutputFormat;
use crate::display::{format_status, StatusView};
use crate::error::Result;

use super::print_json;

pub async fn run<D: Delivery>(
    service: &CaptureService<D>,
    remote: &str,
    state_dir: PathBuf,
    output: OutputFormat,
) -> Result<()> {
    let view = run_impl(service, remote, state_dir).await;
    match output {
        OutputFormat::Text => {
            print!("{}", format_status(&view));
            Ok(())
        }
        OutputFormat::Json => print_json(&view),
    }
}

pub(crate) async fn run_impl<D: Delivery>(
    service: &CaptureService<D>,
    remote: &str,
    state_dir: PathBuf,
) -> StatusView {
    let records = service.get_all().await;
    StatusView {
        online: service.is_online(),
        remote: remote.to_string(),
        backend: service.backend_name(),
        state_dir,
        max_retries: service.max_retries(),
        ..StatusView::default()
    }
    .count(&records)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
