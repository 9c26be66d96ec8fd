//! Schema migrations for the jobboard preference database.
//!
//! Applied versions are recorded in `schema_version`; on open every entry of
//! [`MIGRATIONS`] above the recorded version runs once, in order.

use rusqlite::{params, Connection};
use tracing::info;

/// One schema step: version, label stored alongside it, SQL to run.
pub struct Migration {
    pub version: i32,
    pub label: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    label: "preference cache",
    sql: "CREATE TABLE IF NOT EXISTS preferences (
              key        TEXT PRIMARY KEY,
              value      TEXT NOT NULL,
              updated_at INTEGER NOT NULL
          );",
}];

/// Highest version in [`MIGRATIONS`].
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Version recorded in the database, 0 for a fresh file.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT IFNULL(MAX(version), 0) FROM schema_version", [], |row| row.get(0))
        .unwrap_or(0)
}

/// Brings the schema up to [`CURRENT_SCHEMA_VERSION`]. Idempotent.
///
/// # Errors
/// Returns `rusqlite::Error` if a statement fails; versions applied before
/// the failure stay recorded.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version    INTEGER PRIMARY KEY,
             label      TEXT NOT NULL,
             applied_at INTEGER NOT NULL
         );",
    )?;

    let from = get_schema_version(conn);
    for step in MIGRATIONS.iter().filter(|m| m.version > from) {
        conn.execute_batch(step.sql)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, label, applied_at) VALUES (?1, ?2, ?3)",
            params![step.version, step.label, chrono::Utc::now().timestamp()],
        )?;
        info!(version = step.version, label = step.label, "schema migrated");
    }
    Ok(())
}
