//! Property-based tests for pagination.
//!
//! Concatenating every page must reproduce the sequence, every page but the
//! last must be full, and any requested page lands inside `[1, total]`.

use jobboard::managers::paginator::{paginate, total_pages, Paginator};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn pages_partition_the_sequence(len in 0usize..200, page_size in 1usize..25) {
        let seq: Vec<usize> = (0..len).collect();
        let total = total_pages(len, page_size);
        prop_assert!(total >= 1);

        let mut joined = Vec::new();
        for page in 1..=total {
            let (window, reported) = paginate(&seq, page, page_size);
            prop_assert_eq!(reported, total);
            if page < total {
                prop_assert_eq!(window.len(), page_size);
            }
            joined.extend_from_slice(window);
        }
        prop_assert_eq!(joined, seq);
    }

    #[test]
    fn requested_page_is_clamped(len in 0usize..100, page_size in 1usize..10, page in 0usize..50) {
        let seq: Vec<usize> = (0..len).collect();
        let total = total_pages(len, page_size);
        let (window, _) = paginate(&seq, page, page_size);
        let (expected, _) = paginate(&seq, page.clamp(1, total), page_size);
        prop_assert_eq!(window, expected);
    }

    #[test]
    fn paginator_stays_in_range(
        total in 1usize..20,
        moves in prop::collection::vec(0u8..3, 0..40),
    ) {
        let mut p = Paginator::new(5);
        for m in moves {
            match m {
                0 => p.next(total),
                1 => p.previous(),
                _ => p.go_to(total + 3, total),
            }
            prop_assert!(p.current() >= 1 && p.current() <= total);
        }
    }
}
