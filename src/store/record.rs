//! Row types for the `tokens` table.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use tracing::debug;

use crate::inspector::{TokenKind, TokenMetadata};

/// One row of the v2 `tokens` table.
///
/// `encrypted_value` is the hex ciphertext produced by `Cipher::encrypt`;
/// it is only turned back into plaintext by `RecordStore::get`.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: i64,
    pub project: String,
    pub tag: String,
    pub(crate) encrypted_value: String,
    pub token_type: TokenKind,
    pub expires_at: Option<i64>,
    pub meta_json: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    /// Columns expected by `from_row`, in order.
    pub(crate) const COLUMNS: &'static str =
        "id, project, tag, encrypted_value, token_type, expires_at, meta_json, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let token_type: Option<String> = row.get(4)?;
        let created_at: Option<String> = row.get(7)?;

        Ok(Self {
            id: row.get(0)?,
            project: row.get(1)?,
            tag: row.get(2)?,
            encrypted_value: row.get(3)?,
            token_type: parse_kind(token_type.as_deref()),
            expires_at: row.get(5)?,
            meta_json: row.get(6)?,
            created_at: created_at.as_deref().and_then(parse_timestamp),
        })
    }

    /// The metadata snapshot taken when this record was written.
    ///
    /// Rows written without a `meta_json` snapshot are rebuilt from the
    /// `token_type` and `expires_at` columns.
    pub fn metadata(&self) -> TokenMetadata {
        if let Some(meta) = self
            .meta_json
            .as_deref()
            .and_then(|json| serde_json::from_str::<TokenMetadata>(json).ok())
        {
            return meta;
        }

        TokenMetadata {
            token_type: self.token_type,
            expires_at: self.expires_at.unwrap_or_default(),
            is_jwt: self.token_type == TokenKind::Bearer,
            subject: None,
        }
    }

    /// Drop the ciphertext, keeping what `list` shows.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            project: self.project.clone(),
            tag: self.tag.clone(),
            token_type: self.token_type,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

/// Lightweight view of a record (no ciphertext).
///
/// Returned by `RecordStore::list` so callers can display what is stored
/// without touching any secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub project: String,
    pub tag: String,
    pub token_type: TokenKind,
    pub expires_at: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

fn parse_kind(label: Option<&str>) -> TokenKind {
    match label {
        Some(label) => label.parse().unwrap_or_else(|e| {
            debug!(error = %e, "Unrecognised token type label, treating as Unknown");
            TokenKind::Unknown
        }),
        None => TokenKind::Unknown,
    }
}

/// Parse either an RFC 3339 timestamp or SQLite's `CURRENT_TIMESTAMP`
/// format (`YYYY-MM-DD HH:MM:SS`, UTC).
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
