//! Encrypted token store backed by SQLite.
//!
//! `RecordStore` keeps one row per `(project, tag)`.  Writes classify the
//! raw token, encrypt it and upsert it in a single statement; reads look up
//! the row and decrypt it.  Opening a store always runs the schema check in
//! `migration` first, so no read or write ever sees a legacy table.

pub mod migration;
pub mod record;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::crypto::Cipher;
use crate::errors::{Result, TokenVaultError};
use crate::inspector::{self, TokenMetadata};

pub use migration::{MigrationReport, SchemaState, SkippedRow};
pub use record::{RecordSummary, StoredRecord};

/// Tag used when the caller does not name one.
pub const DEFAULT_TAG: &str = "default";

/// Resolve an optional tag, treating a missing or empty tag as `default`.
pub fn normalize_tag(tag: Option<&str>) -> &str {
    match tag {
        Some(t) if !t.is_empty() => t,
        _ => DEFAULT_TAG,
    }
}

const UPSERT_SQL: &str = "
    INSERT INTO tokens (project, tag, encrypted_value, token_type, expires_at, meta_json)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(project, tag) DO UPDATE SET
        encrypted_value = excluded.encrypted_value,
        token_type = excluded.token_type,
        expires_at = excluded.expires_at,
        meta_json = excluded.meta_json,
        created_at = CURRENT_TIMESTAMP;";

/// Insert or replace the record for `(project, tag)` in one statement.
pub(crate) fn upsert_record(
    conn: &Connection,
    project: &str,
    tag: &str,
    encrypted: &str,
    meta: &TokenMetadata,
) -> Result<()> {
    let meta_json = serde_json::to_string(meta)?;
    conn.execute(
        UPSERT_SQL,
        rusqlite::params![
            project,
            tag,
            encrypted,
            meta.token_type.as_str(),
            meta.expires_at,
            meta_json
        ],
    )?;
    Ok(())
}

/// The token store handle.  One per process; safe to share across threads.
pub struct RecordStore {
    conn: Mutex<Connection>,
    cipher: Cipher,
    path: Option<PathBuf>,
    startup_report: MigrationReport,
}

impl RecordStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open (or create) the database at `path` and bring its schema up to
    /// date before returning.
    pub fn open(path: &Path, cipher: Cipher) -> Result<Self> {
        let conn = Connection::open(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(path, perms) {
                warn!(path = %path.display(), error = %e, "Could not restrict database permissions");
            }
        }

        Self::from_connection(conn, cipher, Some(path.to_path_buf()))
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory(cipher: Cipher) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, cipher, None)
    }

    fn from_connection(conn: Connection, cipher: Cipher, path: Option<PathBuf>) -> Result<Self> {
        let mut store = Self {
            conn: Mutex::new(conn),
            cipher,
            path,
            startup_report: MigrationReport {
                from: SchemaState::Uninitialized,
                upgraded: 0,
                superseded: 0,
                skipped: Vec::new(),
            },
        };
        store.startup_report = store.initialize()?;
        Ok(store)
    }

    /// Verify the connection and run the schema check.
    ///
    /// Re-entrant: on a v2 database this is a no-op.
    pub fn initialize(&self) -> Result<MigrationReport> {
        let conn = self.lock();

        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

        let report = migration::run_migrations(&conn, &self.cipher)?;
        if report.migrated() {
            info!(
                upgraded = report.upgraded,
                skipped = report.skipped.len(),
                "Token store upgraded from v1"
            );
        }
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Token operations
    // ------------------------------------------------------------------

    /// Classify, encrypt and store `raw_secret` under `(project, tag)`,
    /// replacing any previous value.  Returns the metadata snapshot that
    /// was stored with it.
    pub fn put(&self, project: &str, tag: &str, raw_secret: &str) -> Result<TokenMetadata> {
        Self::validate_project(project)?;
        let tag = normalize_tag(Some(tag));

        let meta = inspector::classify(raw_secret);
        let encrypted = self.cipher.encrypt(raw_secret)?;

        upsert_record(&self.lock(), project, tag, &encrypted, &meta)?;
        debug!(project, tag, token_type = %meta.token_type, "Stored token");
        Ok(meta)
    }

    /// Fetch and decrypt the token stored under `(project, tag)`.
    ///
    /// A missing row is `NotFound`; a row that fails authentication is
    /// `DecryptionFailed`.
    pub fn get(&self, project: &str, tag: &str) -> Result<(String, TokenMetadata)> {
        let tag = normalize_tag(Some(tag));

        let record = self
            .find(project, tag)?
            .ok_or_else(|| TokenVaultError::NotFound {
                project: project.to_string(),
                tag: tag.to_string(),
            })?;

        let plaintext = self
            .cipher
            .decrypt(&record.encrypted_value)
            .inspect_err(|_| warn!(project, tag, "Stored token failed authentication"))?;

        Ok((plaintext, record.metadata()))
    }

    /// Remove the record for `(project, tag)`.
    pub fn delete(&self, project: &str, tag: &str) -> Result<()> {
        let tag = normalize_tag(Some(tag));

        let removed = self.lock().execute(
            "DELETE FROM tokens WHERE project = ?1 AND tag = ?2",
            [project, tag],
        )?;

        if removed == 0 {
            return Err(TokenVaultError::NotFound {
                project: project.to_string(),
                tag: tag.to_string(),
            });
        }
        debug!(project, tag, "Deleted token");
        Ok(())
    }

    /// List stored records without decrypting anything, sorted by project
    /// then tag.  Pass a project to restrict the listing.
    pub fn list(&self, project: Option<&str>) -> Result<Vec<RecordSummary>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tokens
             WHERE (?1 IS NULL OR project = ?1)
             ORDER BY project, tag",
            StoredRecord::COLUMNS
        ))?;

        let summaries = stmt
            .query_map([project], |row| {
                StoredRecord::from_row(row).map(|r| r.summary())
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(summaries)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM tokens", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Which schema generation the database currently holds.
    pub fn schema_state(&self) -> Result<SchemaState> {
        migration::detect_state(&self.lock())
    }

    /// What the schema check did when this store was opened.
    pub fn startup_report(&self) -> &MigrationReport {
        &self.startup_report
    }

    /// Path to the database file (`None` for in-memory stores).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn find(&self, project: &str, tag: &str) -> Result<Option<StoredRecord>> {
        let record = self
            .lock()
            .query_row(
                &format!(
                    "SELECT {} FROM tokens WHERE project = ?1 AND tag = ?2",
                    StoredRecord::COLUMNS
                ),
                [project, tag],
                StoredRecord::from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// A panic while holding the lock leaves the connection usable, so a
    /// poisoned mutex is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn validate_project(project: &str) -> Result<()> {
        if project.trim().is_empty() {
            return Err(TokenVaultError::InvalidInput(
                "project name cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
