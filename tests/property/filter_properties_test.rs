//! Property-based tests for the local filter engine.
//!
//! The filter must preserve collection order, only ever return a subset,
//! ignore case, and return everything for an empty query.

use jobboard::managers::filter::filter;
use jobboard::types::blog::Blog;
use jobboard::types::record::{Record, RecordId};
use proptest::prelude::*;

fn blog(id: i64, name: String, author: String) -> Blog {
    Blog {
        id: RecordId::Int(id),
        name,
        author,
        description: String::new(),
        thumbnail: None,
        posted_at: None,
        likes_count: 0,
        comments_count: 0,
        comments: Vec::new(),
    }
}

/// Collections of up to 30 posts with short mixed-case names.
fn arb_blogs() -> impl Strategy<Value = Vec<Blog>> {
    prop::collection::vec(("[a-zA-Z ]{0,12}", "[a-zA-Z]{0,8}"), 0..30).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, author))| blog(i as i64, name, author))
            .collect()
    })
}

const FIELDS: [&str; 2] = ["name", "author"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn empty_query_returns_everything(blogs in arb_blogs()) {
        let hits = filter(&blogs, "", &FIELDS);
        prop_assert_eq!(hits.len(), blogs.len());
    }

    #[test]
    fn hits_are_an_ordered_subset_that_match(blogs in arb_blogs(), query in "[a-zA-Z]{1,3}") {
        let hits = filter(&blogs, &query, &FIELDS);
        let needle = query.to_lowercase();

        let positions: Vec<usize> = hits
            .iter()
            .map(|h| blogs.iter().position(|b| b.id == h.id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

        for hit in &hits {
            let matched = FIELDS
                .iter()
                .any(|f| hit.field(f).unwrap_or("").to_lowercase().contains(&needle));
            prop_assert!(matched);
        }

        let expected = blogs
            .iter()
            .filter(|b| FIELDS.iter().any(|f| b.field(f).unwrap_or("").to_lowercase().contains(&needle)))
            .count();
        prop_assert_eq!(hits.len(), expected);
    }

    #[test]
    fn query_case_does_not_matter(blogs in arb_blogs(), query in "[a-zA-Z]{1,4}") {
        let lower: Vec<_> = filter(&blogs, &query.to_lowercase(), &FIELDS).iter().map(|b| b.id.clone()).collect();
        let upper: Vec<_> = filter(&blogs, &query.to_uppercase(), &FIELDS).iter().map(|b| b.id.clone()).collect();
        prop_assert_eq!(lower, upper);
    }
}
