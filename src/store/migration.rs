//! Schema detection and the one-way v1 → v2 upgrade.
//!
//! Generations of the `tokens` table:
//!
//! - **v1**: `project_name, token_value`, plaintext, one row per write.
//! - **v2**: `(project, tag)` unique, value encrypted, metadata columns.
//!
//! The generation is detected from the table itself, so the check is safe
//! to run on every startup.  A v1 table is renamed to `tokens_v1_backup`
//! (kept forever), a fresh v2 table is created, and every legacy row is
//! classified, encrypted and upserted under the `default` tag.  Rows that
//! cannot be read or encrypted are skipped and reported; they never abort
//! the batch.

use std::collections::HashSet;
use std::fmt;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::{upsert_record, DEFAULT_TAG};
use crate::crypto::Cipher;
use crate::errors::{Result, TokenVaultError};
use crate::inspector;

/// Name of the live table.
pub const TOKENS_TABLE: &str = "tokens";

/// Name the v1 table is renamed to during migration.
pub const LEGACY_BACKUP_TABLE: &str = "tokens_v1_backup";

/// Column whose presence marks the v2 layout.
const V2_MARKER_COLUMN: &str = "encrypted_value";

const CREATE_V2_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS tokens (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project TEXT NOT NULL,
        tag TEXT DEFAULT 'default',
        encrypted_value TEXT NOT NULL,
        token_type TEXT,
        expires_at INTEGER,
        meta_json TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(project, tag)
    );";

/// Which generation of the schema a database holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// No `tokens` table yet.
    Uninitialized,
    /// Legacy plaintext table.
    V1,
    /// Current encrypted table.
    V2,
}

impl fmt::Display for SchemaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::V1 => f.write_str("v1 (plaintext)"),
            Self::V2 => f.write_str("v2 (encrypted)"),
        }
    }
}

/// A legacy row that was not carried over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub rowid: i64,
    pub project: Option<String>,
    pub reason: String,
}

/// Outcome of a migration check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// The generation found before anything ran.
    pub from: SchemaState,
    /// Distinct v2 records produced from legacy rows.
    pub upgraded: usize,
    /// Legacy rows replaced by a later row for the same project.
    pub superseded: usize,
    /// Legacy rows left behind in the backup table.
    pub skipped: Vec<SkippedRow>,
}

impl MigrationReport {
    fn unchanged(from: SchemaState) -> Self {
        Self {
            from,
            upgraded: 0,
            superseded: 0,
            skipped: Vec::new(),
        }
    }

    /// True when a v1 table was upgraded during this run.
    pub fn migrated(&self) -> bool {
        self.from == SchemaState::V1
    }
}

/// Inspect the database and report which generation it holds.
pub fn detect_state(conn: &Connection) -> Result<SchemaState> {
    if !table_exists(conn, TOKENS_TABLE)? {
        return Ok(SchemaState::Uninitialized);
    }

    if table_columns(conn, TOKENS_TABLE)?
        .iter()
        .any(|c| c == V2_MARKER_COLUMN)
    {
        Ok(SchemaState::V2)
    } else {
        Ok(SchemaState::V1)
    }
}

/// Bring the database to the v2 layout.
pub fn run_migrations(conn: &Connection, cipher: &Cipher) -> Result<MigrationReport> {
    let state = detect_state(conn)?;
    debug!(%state, "Detected token schema");

    match state {
        SchemaState::Uninitialized => {
            info!("Initializing v2 token schema");
            create_v2_table(conn)?;
            Ok(MigrationReport::unchanged(state))
        }
        SchemaState::V2 => Ok(MigrationReport::unchanged(state)),
        SchemaState::V1 => {
            info!("Detected v1 database, migrating to v2 (encryption)");
            migrate_v1_to_v2(conn, cipher)
        }
    }
}

fn create_v2_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_V2_TABLE)
        .map_err(|e| TokenVaultError::Migration(format!("failed to create tokens table: {e}")))
}

/// Legacy row as read from the backup table.  Field failures are kept so
/// the row can be reported instead of aborting the scan.
struct LegacyRow {
    rowid: i64,
    project: rusqlite::Result<String>,
    token: rusqlite::Result<String>,
}

fn migrate_v1_to_v2(conn: &Connection, cipher: &Cipher) -> Result<MigrationReport> {
    let columns = table_columns(conn, TOKENS_TABLE)?;
    for required in ["project_name", "token_value"] {
        if !columns.iter().any(|c| c == required) {
            return Err(TokenVaultError::Migration(format!(
                "legacy tokens table has no '{required}' column"
            )));
        }
    }

    // Structural steps succeed or fail together.
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| TokenVaultError::Migration(format!("failed to begin migration: {e}")))?;
    tx.execute_batch(&format!(
        "ALTER TABLE {TOKENS_TABLE} RENAME TO {LEGACY_BACKUP_TABLE};"
    ))
    .map_err(|e| TokenVaultError::Migration(format!("failed to rename old table: {e}")))?;
    tx.execute_batch(CREATE_V2_TABLE)
        .map_err(|e| TokenVaultError::Migration(format!("failed to create v2 table: {e}")))?;
    tx.commit()
        .map_err(|e| TokenVaultError::Migration(format!("failed to commit schema change: {e}")))?;

    let rows = read_legacy_rows(conn)?;
    let mut report = MigrationReport::unchanged(SchemaState::V1);
    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        match upgrade_row(conn, cipher, &row) {
            Ok(project) => {
                if seen.insert(project) {
                    report.upgraded += 1;
                } else {
                    report.superseded += 1;
                }
            }
            Err(reason) => {
                let project = row.project.as_ref().ok().cloned();
                warn!(rowid = row.rowid, project = ?project, %reason, "Skipping legacy row");
                report.skipped.push(SkippedRow {
                    rowid: row.rowid,
                    project,
                    reason,
                });
            }
        }
    }

    info!(
        upgraded = report.upgraded,
        superseded = report.superseded,
        skipped = report.skipped.len(),
        "Migration complete: upgraded {} tokens to v2 encryption",
        report.upgraded
    );
    Ok(report)
}

fn read_legacy_rows(conn: &Connection) -> Result<Vec<LegacyRow>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT rowid, project_name, token_value FROM {LEGACY_BACKUP_TABLE} ORDER BY rowid"
        ))
        .map_err(|e| TokenVaultError::Migration(format!("failed to read legacy rows: {e}")))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(LegacyRow {
                rowid: row.get(0)?,
                project: row.get(1),
                token: row.get(2),
            })
        })
        .map_err(|e| TokenVaultError::Migration(format!("failed to read legacy rows: {e}")))?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| TokenVaultError::Migration(format!("failed to read legacy rows: {e}")))
}

/// Carry one legacy row over, returning the project it was stored under.
/// The error string is the skip reason.
fn upgrade_row(
    conn: &Connection,
    cipher: &Cipher,
    row: &LegacyRow,
) -> std::result::Result<String, String> {
    let project = row
        .project
        .as_ref()
        .map_err(|e| format!("unreadable project name: {e}"))?;
    let token = row
        .token
        .as_ref()
        .map_err(|e| format!("unreadable token value: {e}"))?;

    if project.trim().is_empty() {
        return Err("empty project name".into());
    }

    let meta = inspector::classify(token);
    let encrypted = cipher
        .encrypt(token)
        .map_err(|e| format!("encryption failed: {e}"))?;

    upsert_record(conn, project, DEFAULT_TAG, &encrypted, &meta)
        .map_err(|e| format!("insert failed: {e}"))?;
    Ok(project.clone())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}
