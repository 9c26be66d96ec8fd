//! Tests for the SQLite database layer and its migrations.

use jobboard::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION, MIGRATIONS};
use jobboard::database::Database;
use tempfile::TempDir;

fn table_names(db: &Database) -> Vec<String> {
    let conn = db.connection();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .filter_map(|r| r.ok())
        .collect()
}

#[test]
fn test_open_in_memory_creates_schema() {
    let db = Database::open_in_memory().unwrap();
    let tables = table_names(&db);
    assert!(tables.contains(&"preferences".to_string()), "{:?}", tables);
    assert!(tables.contains(&"schema_version".to_string()), "{:?}", tables);
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    run_all(db.connection()).unwrap();
    run_all(db.connection()).unwrap();

    let applied: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(applied, CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_file_database_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs.db");
    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO preferences (key, value, updated_at) VALUES ('k', '\"v\"', 0)",
                [],
            )
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    let value: String = db
        .connection()
        .query_row("SELECT value FROM preferences WHERE key = 'k'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, "\"v\"");
}

#[test]
fn test_current_version_is_last_migration() {
    let versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
    assert!(versions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(versions.last().copied(), Some(CURRENT_SCHEMA_VERSION));
}
