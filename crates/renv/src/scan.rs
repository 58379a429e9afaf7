//! Reference scanning
//!
//! Finds out which declared variables a raw value refers to. Matching is a plain
//! substring test for `${name}` and `$name`, without looking at what follows a bare
//! reference. If `FOO` and `FOOBAR` are both declared then `$FOOBAR` also counts as a
//! reference to `FOO`. The extra edge can only make ordering stricter (or report a
//! loop that expansion would never hit), it never changes an expanded value.

/// Names out of `known_names` that are referenced by `value`
///
/// The result keeps the iteration order of `known_names`.
pub fn scan<'n, I>(value: &str, known_names: I) -> Vec<&'n str>
where
    I: IntoIterator<Item = &'n str>,
{
    // nothing to reference without a sigil
    if !value.contains('$') {
        return vec![];
    }

    known_names
        .into_iter()
        .filter(|name| references(value, name))
        .collect()
}

/// Does `value` contain `${name}` or `$name`?
pub fn references(value: &str, name: &str) -> bool {
    value.contains(&format!("${{{name}}}")) || value.contains(&format!("${name}"))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const NAMES: [&str; 4] = ["BASE", "BIN", "HOME", "FOO"];

    #[test]
    fn braced_and_bare() {
        assert_eq!(scan("${BASE}/bin:$HOME", NAMES), vec!["BASE", "HOME"]);
    }

    #[test]
    fn no_sigil_no_references() {
        assert!(scan("BASE BIN HOME", NAMES).is_empty());
    }

    #[test]
    fn undeclared_names_are_ignored() {
        assert!(scan("${PATH}:$USER", NAMES).is_empty());
    }

    #[test]
    fn prefix_of_a_longer_bare_reference_matches() {
        // `$FOOBAR` is not a reference to `FOO` during expansion, but the scanner is coarse
        assert_eq!(scan("$FOOBAR", NAMES), vec!["FOO"]);
        assert!(scan("${FOOBAR}", NAMES).is_empty());
    }

    #[test]
    fn escaped_sigil_still_counts() {
        assert_eq!(scan("$$BIN", NAMES), vec!["BIN"]);
    }
}
