// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP delivery to the capture API.
//!
//! - text: `POST {base}/notes|ideas|tasks` with a JSON body
//! - voice: `POST {base}/voice` as `multipart/form-data`
//!
//! Any 2xx is success. Everything else becomes a [`DeliveryError`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use capq_core::{Delivery, DeliveryError, DeliveryResult, TextPayload, VoiceMetadata};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// Path of the voice upload endpoint, relative to the base URL.
pub const VOICE_ENDPOINT: &str = "voice";

/// Longest response body kept in a rejection message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Serialize)]
struct TextBody<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    tags: &'a [String],
}

/// [`Delivery`] over `reqwest`.
pub struct HttpDelivery {
    client: Client,
    base: Url,
}

impl HttpDelivery {
    /// `base` must end in `/` so endpoints join beneath it.
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("capq/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpDelivery { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> DeliveryResult<Url> {
        self.base
            .join(path)
            .map_err(|e| DeliveryError::InvalidRequest(format!("cannot build url for '{path}': {e}")))
    }

    async fn send(&self, request: RequestBuilder) -> DeliveryResult<()> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), url = %response.url(), "capture accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            message: rejection_message(&body, status.canonical_reason()),
        })
    }

    async fn post_text(&self, payload: TextPayload) -> DeliveryResult<()> {
        let url = self.endpoint(payload.category.endpoint())?;
        let body = TextBody {
            content: &payload.content,
            title: payload.title.as_deref(),
            tags: &payload.tags,
        };
        self.send(self.client.post(url).json(&body)).await
    }

    async fn post_voice(&self, metadata: VoiceMetadata, audio: Vec<u8>) -> DeliveryResult<()> {
        let url = self.endpoint(VOICE_ENDPOINT)?;
        let form = voice_form(metadata, audio)?;
        self.send(self.client.post(url).multipart(form)).await
    }
}

impl Delivery for HttpDelivery {
    fn deliver_text(
        &self,
        payload: TextPayload,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + '_>> {
        Box::pin(self.post_text(payload))
    }

    fn deliver_voice(
        &self,
        metadata: VoiceMetadata,
        audio: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + '_>> {
        Box::pin(self.post_voice(metadata, audio))
    }
}

/// Multipart body: an `audio` file part plus optional text parts.
fn voice_form(metadata: VoiceMetadata, audio: Vec<u8>) -> DeliveryResult<Form> {
    let part = Part::bytes(audio)
        .file_name(metadata.filename)
        .mime_str(&metadata.mime_type)
        .map_err(|e| {
            DeliveryError::InvalidRequest(format!("invalid mime type '{}': {e}", metadata.mime_type))
        })?;

    let mut form = Form::new().part("audio", part);
    if let Some(duration) = metadata.duration_secs {
        form = form.text("duration", duration.to_string());
    }
    if let Some(transcription) = metadata.transcription {
        form = form.text("transcription", transcription);
    }
    Ok(form)
}

fn transport_error(e: reqwest::Error) -> DeliveryError {
    if e.is_timeout() {
        DeliveryError::Timeout
    } else if e.is_builder() {
        DeliveryError::InvalidRequest(e.to_string())
    } else {
        DeliveryError::Network(e.to_string())
    }
}

/// Response body trimmed to one line of bounded length, or the status reason.
fn rejection_message(body: &str, reason: Option<&str>) -> String {
    let body = body.trim();
    if body.is_empty() {
        return reason.unwrap_or("no response body").to_string();
    }
    let flat: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > MAX_ERROR_BODY {
        let cut: String = flat.chars().take(MAX_ERROR_BODY).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
