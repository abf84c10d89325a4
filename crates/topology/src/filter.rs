//! Forest filtering by exact vendor or product name

use crate::record::Record;

/// Whether `record` itself is named `needle` (exact, case-sensitive)
pub fn matches(record: &Record, needle: &str) -> bool {
    record.vendor_name == needle || record.product_name == needle
}

/// Keep only the parts of the forest that lead to a match.
///
/// A matching record is kept with its whole subtree. A non-matching record
/// survives only if one of its descendants matches, and then carries only
/// the children that survived.
pub fn filter_forest(roots: Vec<Record>, needle: &str) -> Vec<Record> {
    roots
        .into_iter()
        .filter_map(|root| prune(root, needle))
        .collect()
}

fn prune(mut record: Record, needle: &str) -> Option<Record> {
    if matches(&record, needle) {
        return Some(record);
    }
    let children = std::mem::take(&mut record.children);
    record.children = children
        .into_iter()
        .filter_map(|child| prune(child, needle))
        .collect();
    record.has_children().then_some(record)
}
