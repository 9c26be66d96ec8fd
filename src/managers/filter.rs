//! Local filter engine: case-insensitive substring search over record fields.

use crate::types::record::Record;

/// Returns the records whose configured fields contain `query`.
///
/// A record matches when ANY of `fields` contains the query, ignoring case.
/// The result preserves the collection's order; an empty query matches all.
pub fn filter<'a, R: Record>(collection: &'a [R], query: &str, fields: &[&str]) -> Vec<&'a R> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return collection.iter().collect();
    }
    collection
        .iter()
        .filter(|record| matches(*record, &needle, fields))
        .collect()
}

/// `needle` must already be lower-cased.
fn matches<R: Record>(record: &R, needle: &str, fields: &[&str]) -> bool {
    fields.iter().any(|f| {
        record
            .field(f)
            .map(|text| text.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}
