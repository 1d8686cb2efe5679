// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed primary backend.
//!
//! Captures live in one table keyed by id, with secondary indexes on
//! `status`, `created_at` and `kind` so eligibility scans stay cheap. Audio
//! is stored as a raw BLOB; no base64 on this path.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DurableBackend;
use crate::capture::{CaptureId, CapturePayload, CaptureStatus, QueuedCapture};
use crate::error::{Error, Result};

/// SQL schema for the capture queue.
pub const SCHEMA: &str = r#"
-- seq preserves insertion order across upserts
CREATE TABLE IF NOT EXISTS captures (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    binary_payload BLOB,
    created_at TEXT NOT NULL,
    retry_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    last_error TEXT
);

CREATE INDEX IF NOT EXISTS idx_captures_status ON captures(status);
CREATE INDEX IF NOT EXISTS idx_captures_created_at ON captures(created_at);
CREATE INDEX IF NOT EXISTS idx_captures_kind ON captures(kind);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, payload, binary_payload, created_at, retry_count, status, last_error FROM captures";

fn conversion_error(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(format!(
            "invalid value '{value}' in column '{column}'"
        ))),
    )
}

fn map_row(row: &Row<'_>) -> std::result::Result<QueuedCapture, rusqlite::Error> {
    let id: String = row.get(0)?;
    let payload: String = row.get(1)?;
    let created_at: String = row.get(3)?;
    let status: String = row.get(5)?;

    Ok(QueuedCapture {
        id: CaptureId::parse(&id).map_err(|_| conversion_error("id", &id))?,
        payload: serde_json::from_str::<CapturePayload>(&payload)
            .map_err(|_| conversion_error("payload", &payload))?,
        binary_payload: row.get(2)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| conversion_error("created_at", &created_at))?,
        retry_count: row.get(4)?,
        status: status
            .parse::<CaptureStatus>()
            .map_err(|_| conversion_error("status", &status))?,
        last_error: row.get(6)?,
    })
}

/// SQLite connection holding the capture table.
pub struct IndexedBackend {
    conn: Mutex<Connection>,
}

impl IndexedBackend {
    /// Open the database at `path`, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(IndexedBackend {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(IndexedBackend {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::BackendUnavailable("database lock poisoned".to_string()))
    }
}

impl DurableBackend for IndexedBackend {
    fn name(&self) -> &'static str {
        "indexed"
    }

    fn get_all(&self) -> Result<Vec<QueuedCapture>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY seq"))?;
        let records = stmt
            .query_map([], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get(&self, id: &CaptureId) -> Result<Option<QueuedCapture>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.as_str()],
                map_row,
            )
            .optional()?;
        Ok(record)
    }

    fn put(&self, record: &QueuedCapture) -> Result<()> {
        let payload = serde_json::to_string(&record.payload)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO captures (id, kind, payload, binary_payload, created_at,
             retry_count, status, last_error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                payload = excluded.payload,
                binary_payload = excluded.binary_payload,
                created_at = excluded.created_at,
                retry_count = excluded.retry_count,
                status = excluded.status,
                last_error = excluded.last_error",
            params![
                record.id.as_str(),
                record.kind().as_str(),
                payload,
                record.binary_payload.as_deref(),
                record
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Nanos, true),
                record.retry_count,
                record.status.as_str(),
                record.last_error,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &CaptureId) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM captures WHERE id = ?1", params![id.as_str()])?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM captures", [])?;
        Ok(())
    }

    fn get_eligible(&self, max_retries: u32) -> Result<Vec<QueuedCapture>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE status = 'pending' OR (status = 'failed' AND retry_count < ?1)
             ORDER BY seq"
        ))?;
        let records = stmt
            .query_map(params![max_retries], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
#[path = "indexed_tests.rs"]
mod tests;
