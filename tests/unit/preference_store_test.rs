//! Tests for the preference stores and their JSON helpers.

use std::sync::Arc;

use jobboard::services::preference_store::{
    read_json, write_json, MemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore,
};
use jobboard::types::errors::PreferenceError;
use rstest::rstest;
use tempfile::TempDir;

fn memory() -> Arc<dyn PreferenceStore> {
    Arc::new(MemoryPreferenceStore::new())
}

fn sqlite() -> Arc<dyn PreferenceStore> {
    Arc::new(SqlitePreferenceStore::open_in_memory().unwrap())
}

#[rstest]
#[case::memory(memory())]
#[case::sqlite(sqlite())]
fn test_set_get_remove(#[case] store: Arc<dyn PreferenceStore>) {
    assert_eq!(store.get("saved_jobs").unwrap(), None);

    store.set("saved_jobs", "[1,2]").unwrap();
    assert_eq!(store.get("saved_jobs").unwrap().as_deref(), Some("[1,2]"));

    store.set("saved_jobs", "[3]").unwrap();
    assert_eq!(store.get("saved_jobs").unwrap().as_deref(), Some("[3]"));

    store.remove("saved_jobs").unwrap();
    assert_eq!(store.get("saved_jobs").unwrap(), None);
    store.remove("saved_jobs").unwrap();
}

#[rstest]
#[case::memory(memory())]
#[case::sqlite(sqlite())]
fn test_json_helpers(#[case] store: Arc<dyn PreferenceStore>) {
    write_json(store.as_ref(), "ids", &vec!["a", "b"]).unwrap();
    let ids: Option<Vec<String>> = read_json(store.as_ref(), "ids").unwrap();
    assert_eq!(ids, Some(vec!["a".to_string(), "b".to_string()]));

    let missing: Option<Vec<String>> = read_json(store.as_ref(), "nothing").unwrap();
    assert_eq!(missing, None);
}

#[test]
fn test_corrupt_entry_is_a_serialization_error() {
    let store = MemoryPreferenceStore::new();
    store.set("ids", "{oops").unwrap();
    let err = read_json::<Vec<String>>(&store, "ids").unwrap_err();
    assert!(matches!(err, PreferenceError::Serialization(_)));
}

#[test]
fn test_sqlite_store_is_durable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("preferences.db");
    {
        let store = SqlitePreferenceStore::open(&path).unwrap();
        store.set("liked_comments", "[\"c1\"]").unwrap();
    }
    let store = SqlitePreferenceStore::open(&path).unwrap();
    assert_eq!(store.get("liked_comments").unwrap().as_deref(), Some("[\"c1\"]"));
}
