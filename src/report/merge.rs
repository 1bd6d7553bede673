use crate::models::{CategoryEntry, CategoryMap};

/// Categories every report lists, in this order, whether or not they have
/// entries.
pub(crate) const MANDATORY_CATEGORIES: [&str; 4] = ["food", "education", "health", "housing"];

/// Lay out aggregated categories in report order: the mandatory ones first,
/// then everything else sorted by name (case-sensitive).
pub(crate) fn merge_categories(mut aggregated: CategoryMap) -> Vec<(String, Vec<CategoryEntry>)> {
    let mut merged = Vec::with_capacity(MANDATORY_CATEGORIES.len() + aggregated.len());
    for name in MANDATORY_CATEGORIES {
        let entries = aggregated.remove(name).unwrap_or_default();
        merged.push((name.to_string(), entries));
    }
    // BTreeMap iterates keys in byte order.
    merged.extend(aggregated);
    merged
}
