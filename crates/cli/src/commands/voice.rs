// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use capq_core::{CaptureId, CaptureService, Delivery, VoiceMetadata};

use crate::cli::OutputFormat;
use crate::error::{Error, Result};

use super::add::{report_queued, sync_now};

/// A voice capture as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct VoiceInput {
    pub file: PathBuf,
    pub mime: Option<String>,
    pub duration: Option<f64>,
    pub transcription: Option<String>,
}

/// MIME type for common audio extensions.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("ogg") | Some("oga") | Some("opus") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

impl VoiceInput {
    /// Read the audio file and build the metadata that travels with it.
    pub async fn load(self) -> Result<(VoiceMetadata, Vec<u8>)> {
        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "duration must be a non-negative number of seconds, got {duration}"
                )));
            }
        }

        let filename = self
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!("not an audio file path: {}", self.file.display()))
            })?
            .to_string();
        let audio = tokio::fs::read(&self.file).await?;
        if audio.is_empty() {
            return Err(Error::InvalidInput(format!(
                "audio file is empty: {}",
                self.file.display()
            )));
        }

        let mime = match self.mime {
            Some(mime) => mime,
            None => guess_mime(&self.file).to_string(),
        };
        let mut metadata = VoiceMetadata::new(filename, mime);
        metadata.duration_secs = self.duration;
        metadata.transcription = self
            .transcription
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok((metadata, audio))
    }
}

pub async fn run<D: Delivery>(
    service: &CaptureService<D>,
    input: VoiceInput,
    now: bool,
    output: OutputFormat,
) -> Result<()> {
    let id = run_impl(service, input, now).await?;
    report_queued(service, &id, output).await
}

pub(crate) async fn run_impl<D: Delivery>(
    service: &CaptureService<D>,
    input: VoiceInput,
    now: bool,
) -> Result<CaptureId> {
    let (metadata, audio) = input.load().await?;
    let id = service.enqueue_voice(metadata, Some(audio)).await;
    if now {
        sync_now(service).await;
    }
    Ok(id)
}

#[cfg(test)]
#[path = "voice_tests.rs"]
mod tests;
