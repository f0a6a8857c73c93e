//! Case-insensitive, order-preserving deduplication

use std::collections::HashSet;

/// Remove case-insensitive repeats, keeping the first-seen form of each
/// element in order of first appearance.
pub fn dedup_case_insensitive<I, S>(items: I) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.as_ref().to_lowercase()))
        .collect()
}
