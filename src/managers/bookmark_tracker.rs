//! Bookmark tracker: a persisted set of record ids.
//!
//! The set is read once when the tracker opens and written back in full after
//! every toggle. Ids whose records no longer exist are kept; callers simply
//! never find them in the collection. Ids are stored as they were given, so
//! a text id such as `"007"` reopens as text and not as the number 7.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::services::preference_store::{read_json, write_json, PreferenceStore};
use crate::types::errors::PreferenceError;
use crate::types::record::RecordId;

/// Preference key of the seeker's saved jobs.
pub const SAVED_JOBS_KEY: &str = "saved_jobs";
/// Preference key of the reader's saved blog posts.
pub const SAVED_BLOGS_KEY: &str = "saved_blogs";
/// Preference key of the comments the reader liked.
pub const LIKED_COMMENTS_KEY: &str = "liked_comments";

/// Trait defining bookmark set operations.
pub trait BookmarkTrackerTrait {
    /// Flips membership of `id` and persists. Returns the new membership.
    fn toggle(&mut self, id: &RecordId) -> Result<bool, PreferenceError>;
    fn contains(&self, id: &RecordId) -> bool;
    fn ids(&self) -> Vec<RecordId>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn clear(&mut self) -> Result<(), PreferenceError>;
}

/// Set of ids backed by one preference entry.
pub struct BookmarkTracker {
    store: Arc<dyn PreferenceStore>,
    key: String,
    // Keyed by canonical id string, so `5` and `"5"` are one entry.
    ids: BTreeMap<String, RecordId>,
}

impl BookmarkTracker {
    /// Loads the set stored under `key`, or starts empty.
    ///
    /// An unreadable entry is logged and treated as empty; the next toggle
    /// overwrites it.
    pub fn open(store: Arc<dyn PreferenceStore>, key: &str) -> Result<Self, PreferenceError> {
        let ids = match read_json::<Vec<RecordId>>(store.as_ref(), key) {
            Ok(Some(stored)) => stored.into_iter().map(|id| (id.as_key(), id)).collect(),
            Ok(None) => BTreeMap::new(),
            Err(PreferenceError::Serialization(msg)) => {
                warn!(key, error = %msg, "discarding unreadable bookmark set");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        debug!(key, count = ids.len(), "bookmark set loaded");
        Ok(Self {
            store,
            key: key.to_string(),
            ids,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        let stored: Vec<&RecordId> = self.ids.values().collect();
        write_json(self.store.as_ref(), &self.key, &stored)
    }
}

impl BookmarkTrackerTrait for BookmarkTracker {
    fn toggle(&mut self, id: &RecordId) -> Result<bool, PreferenceError> {
        let key = id.as_key();
        let removed = self.ids.remove(&key);
        if removed.is_none() {
            self.ids.insert(key.clone(), id.clone());
        }
        if let Err(e) = self.persist() {
            // The stored set is unchanged, so the in-memory one must be too.
            match removed {
                Some(previous) => self.ids.insert(key, previous),
                None => self.ids.remove(&key),
            };
            warn!(key = %self.key, id = %id, error = %e, "bookmark toggle not saved");
            return Err(e);
        }
        Ok(removed.is_none())
    }

    fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains_key(&id.as_key())
    }

    fn ids(&self) -> Vec<RecordId> {
        self.ids.values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn clear(&mut self) -> Result<(), PreferenceError> {
        let previous = std::mem::take(&mut self.ids);
        if let Err(e) = self.persist() {
            self.ids = previous;
            return Err(e);
        }
        Ok(())
    }
}
