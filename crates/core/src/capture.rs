// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capture record model.
//!
//! A [`QueuedCapture`] is the unit of durability: one user capture (a text
//! note/idea/task or a voice recording) waiting for delivery. Raw audio is
//! kept as bytes in memory and in the indexed backend; it only becomes base64
//! text when serialized to JSON for the flat-file fallback.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of failed delivery attempts after which a capture is no
/// longer retried automatically.
pub const MAX_RETRY_COUNT: u32 = 3;

const ID_PREFIX: &str = "cap-";

/// Opaque, never-reused capture identifier (`cap-<uuid v7>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureId(String);

impl CaptureId {
    /// Generate a fresh identifier. UUID v7 keeps ids roughly time-ordered.
    pub fn new() -> Self {
        Self(format!("{ID_PREFIX}{}", uuid::Uuid::now_v7()))
    }

    /// Parse and validate an identifier.
    pub fn parse(s: &str) -> Result<Self> {
        let uuid_part = s
            .strip_prefix(ID_PREFIX)
            .ok_or_else(|| Error::InvalidId(s.to_string()))?;
        uuid::Uuid::parse_str(uuid_part).map_err(|_| Error::InvalidId(s.to_string()))?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CaptureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CaptureId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Discriminator fixed at creation; selects payload shape and delivery route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    Text,
    Voice,
}

impl CaptureKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureKind::Text => "text",
            CaptureKind::Voice => "voice",
        }
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(CaptureKind::Text),
            "voice" => Ok(CaptureKind::Voice),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// Delivery state of a queued capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStatus {
    /// Waiting for its first delivery attempt.
    Pending,
    /// A delivery attempt is in flight.
    Syncing,
    /// The last delivery attempt failed; see `last_error`.
    Failed,
}

impl CaptureStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureStatus::Pending => "pending",
            CaptureStatus::Syncing => "syncing",
            CaptureStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptureStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(CaptureStatus::Pending),
            "syncing" => Ok(CaptureStatus::Syncing),
            "failed" => Ok(CaptureStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Target resource for a text capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCategory {
    #[default]
    Note,
    Idea,
    Task,
}

impl TextCategory {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextCategory::Note => "note",
            TextCategory::Idea => "idea",
            TextCategory::Task => "task",
        }
    }

    /// Remote collection that receives captures of this category.
    pub fn endpoint(&self) -> &'static str {
        match self {
            TextCategory::Note => "notes",
            TextCategory::Idea => "ideas",
            TextCategory::Task => "tasks",
        }
    }
}

impl fmt::Display for TextCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TextCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "note" | "notes" => Ok(TextCategory::Note),
            "idea" | "ideas" => Ok(TextCategory::Idea),
            "task" | "tasks" => Ok(TextCategory::Task),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// Structured fields of a text capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPayload {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: TextCategory,
}

impl TextPayload {
    pub fn new(content: impl Into<String>) -> Self {
        TextPayload {
            content: content.into(),
            title: None,
            tags: Vec::new(),
            category: TextCategory::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_category(mut self, category: TextCategory) -> Self {
        self.category = category;
        self
    }
}

/// Metadata of a voice capture. The audio itself travels in
/// [`QueuedCapture::binary_payload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceMetadata {
    pub filename: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
}

impl VoiceMetadata {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        VoiceMetadata {
            filename: filename.into(),
            mime_type: mime_type.into(),
            duration_secs: None,
            transcription: None,
        }
    }
}

/// Kind-specific payload. The serde tag doubles as the persisted `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapturePayload {
    Text(TextPayload),
    Voice(VoiceMetadata),
}

impl CapturePayload {
    pub fn kind(&self) -> CaptureKind {
        match self {
            CapturePayload::Text(_) => CaptureKind::Text,
            CapturePayload::Voice(_) => CaptureKind::Voice,
        }
    }
}

impl From<TextPayload> for CapturePayload {
    fn from(payload: TextPayload) -> Self {
        CapturePayload::Text(payload)
    }
}

impl From<VoiceMetadata> for CapturePayload {
    fn from(meta: VoiceMetadata) -> Self {
        CapturePayload::Voice(meta)
    }
}

/// A capture waiting in the offline queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedCapture {
    pub id: CaptureId,
    pub payload: CapturePayload,
    /// Raw binary content (recorded audio). Serialized as base64.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_bytes"
    )]
    pub binary_payload: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub retry_count: u32,
    pub status: CaptureStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl QueuedCapture {
    /// Build a fresh `pending` record with a new id.
    pub fn new(payload: CapturePayload, binary_payload: Option<Vec<u8>>) -> Self {
        QueuedCapture {
            id: CaptureId::new(),
            payload,
            binary_payload,
            created_at: Utc::now(),
            retry_count: 0,
            status: CaptureStatus::Pending,
            last_error: None,
        }
    }

    pub fn kind(&self) -> CaptureKind {
        self.payload.kind()
    }

    /// Whether a sync run may attempt delivery of this record.
    pub fn is_eligible(&self, max_retries: u32) -> bool {
        match self.status {
            CaptureStatus::Pending => true,
            CaptureStatus::Failed => self.retry_count < max_retries,
            CaptureStatus::Syncing => false,
        }
    }

    /// Failed and out of automatic retries.
    pub fn is_exhausted(&self, max_retries: u32) -> bool {
        self.status == CaptureStatus::Failed && self.retry_count >= max_retries
    }

    /// Record a failed delivery attempt.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.status = CaptureStatus::Failed;
        self.retry_count = self.retry_count.saturating_add(1);
        self.last_error = Some(error.into());
    }
}

/// Shallow partial update for [`QueuedCapture`]. The id is never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturePatch {
    pub status: Option<CaptureStatus>,
    pub retry_count: Option<u32>,
    pub last_error: Option<String>,
    pub payload: Option<CapturePayload>,
    pub binary_payload: Option<Vec<u8>>,
}

impl CapturePatch {
    pub fn status(status: CaptureStatus) -> Self {
        CapturePatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    pub fn with_last_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self
    }

    pub fn with_payload(mut self, payload: CapturePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_binary_payload(mut self, bytes: Vec<u8>) -> Self {
        self.binary_payload = Some(bytes);
        self
    }

    /// Merge into `record`.
    ///
    /// A payload of a different kind is ignored and `retry_count` never
    /// decreases. Returns `false` if any field was rejected.
    pub fn apply(self, record: &mut QueuedCapture) -> bool {
        let mut accepted = true;
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(retry_count) = self.retry_count {
            if retry_count < record.retry_count {
                accepted = false;
            }
            record.retry_count = record.retry_count.max(retry_count);
        }
        if let Some(error) = self.last_error {
            record.last_error = Some(error);
        }
        if let Some(payload) = self.payload {
            if payload.kind() == record.kind() {
                record.payload = payload;
            } else {
                accepted = false;
            }
        }
        if let Some(bytes) = self.binary_payload {
            record.binary_payload = Some(bytes);
        }
        accepted
    }
}

/// Encode binary content as text-safe base64.
pub fn encode_binary(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 produced by [`encode_binary`].
pub fn decode_binary(encoded: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded)?)
}

mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&super::encode_binary(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| super::decode_binary(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
