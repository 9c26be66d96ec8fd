//! Local preference cache.
//!
//! Key/value entries whose values are JSON documents: bookmark sets, liked
//! comments, the signed-in session. Entries are read once at startup and
//! overwritten wholesale on every change (single writer, last write wins).

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::types::errors::PreferenceError;

/// Synchronous key/value storage for client preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
    fn remove(&self, key: &str) -> Result<(), PreferenceError>;
}

/// Reads and deserializes the entry under `key`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn PreferenceStore,
    key: &str,
) -> Result<Option<T>, PreferenceError> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PreferenceError::Serialization(format!("{}: {}", key, e))),
        None => Ok(None),
    }
}

/// Serializes `value` and overwrites the entry under `key`.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn PreferenceStore,
    key: &str,
    value: &T,
) -> Result<(), PreferenceError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| PreferenceError::Serialization(format!("{}: {}", key, e)))?;
    store.set(key, &raw)
}

/// Durable store in the `preferences` table.
pub struct SqlitePreferenceStore {
    db: Mutex<Database>,
}

impl SqlitePreferenceStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PreferenceError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| PreferenceError::Storage(e.to_string()))?;
        }
        Ok(Self::from_database(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, PreferenceError> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, PreferenceError> {
        self.db
            .lock()
            .map_err(|_| PreferenceError::Storage("preference database lock poisoned".to_string()))
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let db = self.lock()?;
        let value = db
            .connection()
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let db = self.lock()?;
        db.connection().execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        let db = self.lock()?;
        db.connection()
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Non-durable store for tests and the demo.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        self.lock().remove(key);
        Ok(())
    }
}
