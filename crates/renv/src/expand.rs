//! Substitution of references within a single value
//!
//! Reference syntax follows the shell:
//!
//! | **text**   | **result**                                                    |
//! |------------|---------------------------------------------------------------|
//! | `$$`       | a literal `$`, never the start of a reference                 |
//! | `${name}`  | value of `name`, the name is everything up to the next `}`     |
//! | `$name`    | value of `name`, the name is the longest `[A-Za-z0-9_]` run    |
//! | `$1`, `$?` | single character names: digits and one of `*#@!?-`            |
//! | other `$`  | kept as is (`$` at the end, `${}`, `${` without closing `}`)  |
//!
//! A name is looked up in the resolved variables first, then in the ambient
//! environment. What happens when neither knows it is decided by [UndefinedPolicy].
//!
//! Malformed references such as `${}` or an unterminated `${NAME` are not consumed,
//! they stay in the output as written.
//!
//! The value is scanned exactly once. Substituted text is never looked at again, so a
//! value containing `$` can not trigger further expansion.
use crate::environment::Environment;
use crate::resolve::ResolvedMapping;
use std::convert::Infallible;

/// What to do with a reference nobody knows
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedPolicy {
    /// Expand to the empty string (shell behavior)
    #[default]
    Empty,
    /// Fail with [UndefinedReferenceError]
    Error,
}

/// Expands `value` against already resolved variables and the environment
///
/// Unknown references expand to the empty string.
pub fn expand<E: Environment + ?Sized>(
    value: &str,
    resolved: &ResolvedMapping,
    environment: &E,
) -> String {
    let result = substitute(value, |name| {
        Ok::<_, Infallible>(lookup(name, resolved, environment).unwrap_or_default())
    });

    match result {
        Ok(expanded) => expanded,
        Err(never) => match never {},
    }
}

/// Expander with a configurable [UndefinedPolicy]
#[derive(derive_new::new, Debug)]
pub struct Expander<'a, E: ?Sized> {
    resolved: &'a ResolvedMapping,
    environment: &'a E,
    on_undefined: UndefinedPolicy,
}

impl<E: Environment + ?Sized> Expander<'_, E> {
    pub fn expand(&self, value: &str) -> Result<String, UndefinedReferenceError> {
        substitute(value, |name| {
            match lookup(name, self.resolved, self.environment) {
                Some(found) => Ok(found),
                None if self.on_undefined == UndefinedPolicy::Empty => Ok(String::new()),
                None => Err(UndefinedReferenceError {
                    name: name.to_string(),
                }),
            }
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{name} is neither declared nor set in the environment")]
pub struct UndefinedReferenceError {
    pub name: String,
}

fn lookup<E: Environment + ?Sized>(
    name: &str,
    resolved: &ResolvedMapping,
    environment: &E,
) -> Option<String> {
    if let Some(value) = resolved.get(name) {
        return Some(value.clone());
    }

    let value = environment.lookup(name);
    tracing::trace!(%name, found = value.is_some(), "environment lookup");
    value
}

fn substitute<Err>(
    value: &str,
    mut lookup: impl FnMut(&str) -> Result<String, Err>,
) -> Result<String, Err> {
    let mut output = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(sigil) = rest.find('$') {
        output.push_str(&rest[..sigil]);
        let after_sigil = &rest[sigil + 1..];

        rest = match Token::parse(after_sigil) {
            Token::Escape => {
                output.push('$');
                &after_sigil[1..]
            }
            Token::Reference { name, len } => {
                output.push_str(&lookup(name)?);
                &after_sigil[len..]
            }
            Token::Literal => {
                output.push('$');
                after_sigil
            }
        };
    }

    output.push_str(rest);
    Ok(output)
}

/// What follows a `$`
#[derive(Debug, PartialEq)]
enum Token<'a> {
    /// `$$`
    Escape,
    /// `len` is the number of bytes after the `$` that belong to the reference
    Reference { name: &'a str, len: usize },
    /// not a reference, the `$` is kept
    Literal,
}

impl<'a> Token<'a> {
    fn parse(after_sigil: &'a str) -> Self {
        let Some(&first) = after_sigil.as_bytes().first() else {
            return Token::Literal;
        };

        match first {
            b'$' => Token::Escape,
            b'{' => match after_sigil[1..].find('}') {
                None | Some(0) => Token::Literal,
                Some(end) => Token::Reference {
                    name: &after_sigil[1..=end],
                    len: end + 2,
                },
            },
            b'*' | b'#' | b'@' | b'!' | b'?' | b'-' | b'0'..=b'9' => Token::Reference {
                name: &after_sigil[..1],
                len: 1,
            },
            _ => {
                let len = after_sigil
                    .bytes()
                    .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    .count();

                if len == 0 {
                    return Token::Literal;
                }

                Token::Reference {
                    name: &after_sigil[..len],
                    len,
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::EmptyEnvironment;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn resolved() -> ResolvedMapping {
        crate::definitions! {
            "BASE" => "/opt/app",
            "DOLLAR" => "$HOME",
        }
    }

    fn environment() -> IndexMap<String, String> {
        crate::definitions! {
            "HOME" => "/home/user",
            "BASE" => "/ignored",
        }
    }

    fn expand(value: &str) -> String {
        super::expand(value, &resolved(), &environment())
    }

    #[test]
    fn braced_and_bare() {
        assert_eq!(expand("${BASE}/bin:$HOME"), "/opt/app/bin:/home/user");
    }

    #[test]
    fn resolved_wins_over_environment() {
        assert_eq!(expand("$BASE"), "/opt/app");
    }

    #[test]
    fn unknown_is_empty() {
        assert_eq!(expand("${UNSET}"), "");
        assert_eq!(expand("a${UNSET}b$UNSET"), "ab");
    }

    #[test]
    fn escaped_sigil_is_literal() {
        assert_eq!(expand("$$BASE"), "$BASE");
        assert_eq!(expand("$${BASE}"), "${BASE}");
        assert_eq!(expand("cost: $$5"), "cost: $5");
        assert_eq!(expand("$$$BASE"), "$/opt/app");
    }

    #[test]
    fn substituted_text_is_not_expanded_again() {
        assert_eq!(expand("${DOLLAR}"), "$HOME");
    }

    #[test]
    fn bare_name_ends_at_first_non_identifier() {
        assert_eq!(expand("$BASE.d/$BASE-x"), "/opt/app.d//opt/app-x");
        assert_eq!(expand("$BASEBALL"), "");
    }

    #[test]
    fn not_a_reference() {
        assert_eq!(expand("trailing $"), "trailing $");
        assert_eq!(expand("a $ b"), "a $ b");
        assert_eq!(expand("${}"), "${}");
        assert_eq!(expand("${BASE"), "${BASE");
        assert_eq!(expand("$/"), "$/");
    }

    #[test]
    fn single_character_names() {
        assert_eq!(expand("$1abc"), "abc");
        assert_eq!(expand("$?"), "");
    }

    #[test]
    fn non_ascii_text_is_kept() {
        assert_eq!(expand("größe=${BASE}→$HOME€"), "größe=/opt/app→/home/user€");
    }

    #[test]
    fn strict_expander_reports_the_name() {
        let resolved = resolved();
        let expander = Expander::new(&resolved, &EmptyEnvironment, UndefinedPolicy::Error);

        assert_eq!(expander.expand("$BASE/x").unwrap(), "/opt/app/x");
        assert_eq!(
            expander.expand("$BASE/$MISSING").unwrap_err(),
            UndefinedReferenceError {
                name: "MISSING".to_string()
            }
        );
    }

    #[test]
    fn empty_environment_value_is_defined() {
        let resolved = ResolvedMapping::new();
        let environment = crate::definitions! {"EMPTY" => ""};
        let expander = Expander::new(&resolved, &environment, UndefinedPolicy::Error);

        assert_eq!(expander.expand("[$EMPTY]").unwrap(), "[]");
    }

    #[test]
    fn tokens() {
        assert_eq!(Token::parse(""), Token::Literal);
        assert_eq!(Token::parse("$x"), Token::Escape);
        assert_eq!(
            Token::parse("{a b}c"),
            Token::Reference {
                name: "a b",
                len: 5
            }
        );
        assert_eq!(
            Token::parse("NAME_1-rest"),
            Token::Reference {
                name: "NAME_1",
                len: 6
            }
        );
    }
}
