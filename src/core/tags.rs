use std::collections::BTreeSet;

/// Check whether a record's tags satisfy the requested tags
///
/// An empty request matches everything. Otherwise at least one requested tag
/// must be present on the record (OR semantics). Comparison is exact and
/// case-sensitive.
#[inline]
pub fn matches(record_tags: &BTreeSet<String>, requested_tags: &BTreeSet<String>) -> bool {
    requested_tags.is_empty() || !record_tags.is_disjoint(requested_tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_empty_request_matches_all() {
        assert!(matches(&tags(&[]), &tags(&[])));
        assert!(matches(&tags(&["English"]), &tags(&[])));
    }

    #[test]
    fn test_untagged_record_never_matches_filter() {
        assert!(!matches(&tags(&[]), &tags(&["English"])));
    }

    #[test]
    fn test_any_overlap_matches() {
        let record = tags(&["German", "Spanish"]);
        assert!(matches(&record, &tags(&["Spanish", "Japanese"])));
        assert!(!matches(&record, &tags(&["Japanese", "Korean"])));
    }

    #[test]
    fn test_exact_case_sensitive() {
        assert!(!matches(&tags(&["english"]), &tags(&["English"])));
        assert!(!matches(&tags(&["English "]), &tags(&["English"])));
    }
}
