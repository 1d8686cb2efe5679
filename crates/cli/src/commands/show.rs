// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use capq_core::{CaptureService, Delivery};

use crate::cli::OutputFormat;
use crate::display::{format_record_details, RecordView};
use crate::error::Result;

use super::{print_json, resolve};

pub async fn run<D: Delivery>(
    service: &CaptureService<D>,
    id: &str,
    output: OutputFormat,
) -> Result<()> {
    let record = resolve(service, id).await?;
    let max_retries = service.max_retries();

    match output {
        OutputFormat::Text => {
            print!("{}", format_record_details(&record, max_retries));
            Ok(())
        }
        OutputFormat::Json => print_json(&RecordView::new(&record, max_retries)),
    }
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
