const SEPARATOR: &str = "_";

/// Identity of a role parameter binding: `<role>_<key>_<value>`.
///
/// Fields containing `_` can collide with another combination
/// (`("a_b", "c", "d")` and `("a", "b_c", "d")` both give `a_b_c_d`).
pub fn derive(role: &str, key: &str, value: &str) -> String {
    [role, key, value].join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::derive;

    #[test]
    fn joins_in_order() {
        assert_eq!(
            derive("alice", "search_path", "public"),
            "alice_search_path_public"
        );
        assert_eq!(
            derive("alice", "search_path", "public"),
            derive("alice", "search_path", "public")
        );
    }

    #[test]
    fn separator_collision() {
        assert_eq!(derive("a_b", "c", "d"), derive("a", "b_c", "d"));
    }
}
