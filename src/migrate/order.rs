//! Table processing order.

use std::collections::HashSet;

/// Compute the order tables are migrated in.
///
/// Tables named in `preferred` come first, in that order, followed by the
/// remaining `discovered` tables in discovery order. Preferred names that were
/// not discovered are ignored, tables in `skip` never appear, and each table
/// appears at most once regardless of duplicates in the inputs.
pub fn order_tables(
    discovered: &[String],
    preferred: &[String],
    skip: &HashSet<String>,
) -> Vec<String> {
    let available: HashSet<&str> = discovered
        .iter()
        .map(String::as_str)
        .filter(|name| !skip.contains(*name))
        .collect();

    let mut seen: HashSet<&str> = HashSet::with_capacity(available.len());
    let mut ordered = Vec::with_capacity(available.len());

    for name in preferred.iter().chain(discovered) {
        if available.contains(name.as_str()) && seen.insert(name.as_str()) {
            ordered.push(name.clone());
        }
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn skip(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preferred_tables_first() {
        let order = order_tables(
            &names(&["boards", "accounts", "tags"]),
            &names(&["accounts", "boards"]),
            &skip(&[]),
        );
        assert_eq!(order, names(&["accounts", "boards", "tags"]));
    }

    #[test]
    fn test_unknown_preferred_tables_ignored() {
        let order = order_tables(
            &names(&["tags", "accounts"]),
            &names(&["sessions", "accounts", "invoices"]),
            &skip(&[]),
        );
        assert_eq!(order, names(&["accounts", "tags"]));
    }

    #[test]
    fn test_skipped_tables_excluded_from_both_halves() {
        let order = order_tables(
            &names(&["accounts", "jobs", "schema_migrations", "tags"]),
            &names(&["jobs", "accounts"]),
            &skip(&["jobs", "schema_migrations"]),
        );
        assert_eq!(order, names(&["accounts", "tags"]));
    }

    #[test]
    fn test_duplicates_never_repeat() {
        let order = order_tables(
            &names(&["a", "b", "a"]),
            &names(&["b", "b", "a"]),
            &skip(&[]),
        );
        assert_eq!(order, names(&["b", "a"]));
    }

    #[test]
    fn test_no_preferred_keeps_discovery_order() {
        let order = order_tables(&names(&["c", "a", "b"]), &[], &skip(&[]));
        assert_eq!(order, names(&["c", "a", "b"]));
    }

    #[test]
    fn test_empty_source() {
        assert!(order_tables(&[], &names(&["accounts"]), &skip(&[])).is_empty());
    }
}
