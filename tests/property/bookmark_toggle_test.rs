//! Property-based tests for bookmark toggling.
//!
//! After any sequence of toggles an id is saved exactly when it was toggled
//! an odd number of times, and reopening the tracker yields the same set,
//! including text ids that look like numbers (`"007"`).

use std::collections::HashMap;
use std::sync::Arc;

use jobboard::managers::bookmark_tracker::{BookmarkTracker, BookmarkTrackerTrait, SAVED_JOBS_KEY};
use jobboard::services::preference_store::{MemoryPreferenceStore, PreferenceStore};
use jobboard::types::record::RecordId;
use proptest::prelude::*;

fn arb_id() -> impl Strategy<Value = RecordId> {
    prop_oneof![
        (0i64..20).prop_map(RecordId::Int),
        "[0-9a-f]{1,4}".prop_map(RecordId::Text),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn membership_follows_toggle_parity(toggles in prop::collection::vec(arb_id(), 0..40)) {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
        let mut tracker = BookmarkTracker::open(store.clone(), SAVED_JOBS_KEY).unwrap();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for id in &toggles {
            tracker.toggle(id).unwrap();
            *counts.entry(id.as_key()).or_default() += 1;
        }

        for id in &toggles {
            let odd = counts[&id.as_key()] % 2 == 1;
            prop_assert_eq!(tracker.contains(id), odd);
        }
        let expected = counts.values().filter(|c| *c % 2 == 1).count();
        prop_assert_eq!(tracker.len(), expected);

        let reopened = BookmarkTracker::open(store, SAVED_JOBS_KEY).unwrap();
        prop_assert_eq!(reopened.ids(), tracker.ids());
        for id in &toggles {
            prop_assert_eq!(reopened.contains(id), tracker.contains(id));
        }
    }
}
