//! Canonical identity for the set of sessions mounted in the page.

/// Joins session ids in a fingerprint.
pub const FINGERPRINT_SEPARATOR: &str = ";";

/// Derive the fingerprint of a session set.
///
/// Ids are sorted lexicographically and joined with
/// [`FINGERPRINT_SEPARATOR`], so the result depends only on which sessions
/// are present and never on the order they were discovered in. An empty
/// set yields the empty string.
pub fn compute_fingerprint<I, S>(session_ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids: Vec<S> = session_ids.into_iter().collect();
    ids.sort_by(|left, right| left.as_ref().cmp(right.as_ref()));

    let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
    ids.join(FINGERPRINT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::compute_fingerprint;

    #[test]
    fn it_is_independent_of_input_order() {
        let forward = compute_fingerprint(["sess-a", "sess-b"]);
        let backward = compute_fingerprint(["sess-b", "sess-a"]);

        assert_eq!(forward, backward);
        assert_eq!(forward, "sess-a;sess-b");
    }

    #[test]
    fn it_is_empty_for_no_sessions() {
        assert_eq!(compute_fingerprint(Vec::<String>::new()), "");
    }

    #[test]
    fn it_keeps_a_single_session_unchanged() {
        assert_eq!(compute_fingerprint(vec!["phx-F1".to_string()]), "phx-F1");
    }
}
