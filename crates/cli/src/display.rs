// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text and JSON views of queued captures and sync results.

use std::path::PathBuf;

use capq_core::{CapturePayload, CaptureStatus, QueuedCapture, SyncReport};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::colors;

/// Longest content preview shown in one-line listings.
const PREVIEW_CHARS: usize = 48;

/// JSON view of a record. Audio is summarised by size, never inlined.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    pub id: &'a str,
    pub kind: &'static str,
    pub status: &'static str,
    pub retry_count: u32,
    pub exhausted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<&'a str>,
    pub payload: &'a CapturePayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bytes: Option<usize>,
}

impl<'a> RecordView<'a> {
    pub fn new(record: &'a QueuedCapture, max_retries: u32) -> Self {
        RecordView {
            id: record.id.as_str(),
            kind: record.kind().as_str(),
            status: record.status.as_str(),
            retry_count: record.retry_count,
            exhausted: record.is_exhausted(max_retries),
            created_at: record.created_at,
            last_error: record.last_error.as_deref(),
            payload: &record.payload,
            audio_bytes: record.binary_payload.as_ref().map(Vec::len),
        }
    }
}

/// Queue overview for `capq status`.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct StatusView {
    pub online: bool,
    pub remote: String,
    pub backend: &'static str,
    pub state_dir: PathBuf,
    pub queued: usize,
    pub pending: usize,
    pub failed: usize,
    pub exhausted: usize,
    pub max_retries: u32,
}

impl StatusView {
    /// Fill the counters from `records`.
    pub fn count(mut self, records: &[QueuedCapture]) -> Self {
        self.queued = records.len();
        self.pending = records
            .iter()
            .filter(|r| r.status != CaptureStatus::Syncing)
            .count();
        self.failed = records
            .iter()
            .filter(|r| r.status == CaptureStatus::Failed && !r.is_exhausted(self.max_retries))
            .count();
        self.exhausted = records
            .iter()
            .filter(|r| r.is_exhausted(self.max_retries))
            .count();
        self
    }
}

/// Short human description of a capture's content.
pub fn summary(record: &QueuedCapture) -> String {
    match &record.payload {
        CapturePayload::Text(text) => {
            let source = text.title.as_deref().unwrap_or(&text.content);
            let flat = source.split_whitespace().collect::<Vec<_>>().join(" ");
            if flat.chars().count() > PREVIEW_CHARS {
                let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
                format!("{cut}...")
            } else {
                flat
            }
        }
        CapturePayload::Voice(voice) => match voice.duration_secs {
            Some(secs) => format!("{} ({secs:.1}s)", voice.filename),
            None => voice.filename.clone(),
        },
    }
}

/// Display label; failed records out of retries read `exhausted`.
pub fn status_label(record: &QueuedCapture, max_retries: u32) -> &'static str {
    if record.is_exhausted(max_retries) {
        "exhausted"
    } else {
        record.status.as_str()
    }
}

/// Category for text captures, `voice` otherwise.
fn kind_label(record: &QueuedCapture) -> &'static str {
    match &record.payload {
        CapturePayload::Text(text) => text.category.as_str(),
        CapturePayload::Voice(_) => "voice",
    }
}

/// One line per record: `id  status  kind  retries  summary`.
pub fn format_record_line(record: &QueuedCapture, max_retries: u32, color: bool) -> String {
    let exhausted = record.is_exhausted(max_retries);
    let label = format!("{:<9}", status_label(record, max_retries));
    format!(
        "{}  {}  {:<5}  {}/{}  {}",
        colors::context(record.id.as_str(), color),
        colors::status(&label, record.status, exhausted, color),
        kind_label(record),
        record.retry_count,
        max_retries,
        summary(record)
    )
}

/// Multi-line detail view for `capq show`.
pub fn format_record_details(record: &QueuedCapture, max_retries: u32) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", record.id));
    out.push_str(&format!("Kind: {}\n", kind_label(record)));
    out.push_str(&format!("Status: {}\n", status_label(record, max_retries)));
    out.push_str(&format!("Retries: {}/{}\n", record.retry_count, max_retries));
    out.push_str(&format!(
        "Created: {}\n",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(error) = &record.last_error {
        out.push_str(&format!("Last error: {error}\n"));
    }

    match &record.payload {
        CapturePayload::Text(text) => {
            if let Some(title) = &text.title {
                out.push_str(&format!("Title: {title}\n"));
            }
            if !text.tags.is_empty() {
                out.push_str(&format!("Tags: {}\n", text.tags.join(", ")));
            }
            out.push_str("\nContent:\n");
            for line in text.content.lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
        CapturePayload::Voice(voice) => {
            out.push_str(&format!("File: {} ({})\n", voice.filename, voice.mime_type));
            if let Some(secs) = voice.duration_secs {
                out.push_str(&format!("Duration: {secs:.1}s\n"));
            }
            match &record.binary_payload {
                Some(audio) => out.push_str(&format!("Audio: {} bytes\n", audio.len())),
                None => out.push_str("Audio: missing\n"),
            }
            if let Some(text) = &voice.transcription {
                out.push_str(&format!("\nTranscription:\n  {text}\n"));
            }
        }
    }
    out
}

/// Result of a sync run: a count line plus one line per failure.
pub fn format_report(report: &SyncReport) -> String {
    let mut out = format!("synced {}, failed {}", report.synced, report.failed);
    for failure in &report.errors {
        out.push_str(&format!("\n  {}: {}", failure.id, failure.error));
    }
    out
}

pub fn format_status(status: &StatusView) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Remote: {} ({})\n",
        status.remote,
        if status.online { "online" } else { "offline" }
    ));
    out.push_str(&format!(
        "Storage: {} ({})\n",
        status.backend,
        status.state_dir.display()
    ));
    out.push_str(&format!("Queued: {}\n", status.queued));
    out.push_str(&format!("  pending: {}\n", status.pending));
    out.push_str(&format!("  failed: {}\n", status.failed));
    out.push_str(&format!(
        "  exhausted: {} (max retries {})\n",
        status.exhausted, status.max_retries
    ));
    out
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
