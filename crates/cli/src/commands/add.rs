// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use capq_core::{CaptureId, CaptureService, Delivery, TextCategory, TextPayload};

use crate::cli::OutputFormat;
use crate::display::{format_report, RecordView};
use crate::error::{Error, Result};

use super::print_json;

/// Fields of a text capture as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub content: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub category: TextCategory,
}

impl TextInput {
    /// Trimmed payload; blank tags are dropped and duplicates collapsed.
    pub fn into_payload(self) -> Result<TextPayload> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput("capture content cannot be empty".into()));
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        let mut payload = TextPayload::new(content)
            .with_tags(tags)
            .with_category(self.category);
        if let Some(title) = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            payload = payload.with_title(title);
        }
        Ok(payload)
    }
}

pub async fn run<D: Delivery>(
    service: &CaptureService<D>,
    input: TextInput,
    now: bool,
    output: OutputFormat,
) -> Result<()> {
    let id = run_impl(service, input, now).await?;
    report_queued(service, &id, output).await
}

/// Queue the capture and, with `now`, run a sync immediately.
pub(crate) async fn run_impl<D: Delivery>(
    service: &CaptureService<D>,
    input: TextInput,
    now: bool,
) -> Result<CaptureId> {
    let payload = input.into_payload()?;
    let id = service.enqueue_text(payload).await;
    if now {
        sync_now(service).await;
    }
    Ok(id)
}

/// One sync attempt for `--now`; the outcome goes to stderr.
pub(crate) async fn sync_now<D: Delivery>(service: &CaptureService<D>) {
    if !service.is_online() {
        eprintln!("offline: capture queued for later delivery");
        return;
    }
    let report = service.run_sync().await;
    eprintln!("{}", format_report(&report));
}

/// Print the new capture ID, or its record as JSON. A capture that was
/// already delivered by `--now` prints as `{"id": ..., "synced": true}`.
pub(crate) async fn report_queued<D: Delivery>(
    service: &CaptureService<D>,
    id: &CaptureId,
    output: OutputFormat,
) -> Result<()> {
    match output {
        OutputFormat::Text => {
            println!("{id}");
            Ok(())
        }
        OutputFormat::Json => match service.get(id).await {
            Some(record) => print_json(&RecordView::new(&record, service.max_retries())),
            None => print_json(&serde_json::json!({ "id": id, "synced": true })),
        },
    }
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
