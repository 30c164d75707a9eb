//! Environment variable interpolation for string values.
//!
//! Supports `${NAME}` and `${NAME|default}`. Whitespace around the name and
//! the default is ignored. Every token in a string is resolved against the
//! input in one pass, so substituted text is never expanded again.
//!
//! A variable that is unset or empty falls back to the default. Without a
//! default the token is left untouched.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

fn env_token() -> Option<&'static Regex> {
    static MATCHER: OnceLock<Option<Regex>> = OnceLock::new();
    MATCHER
        .get_or_init(|| Regex::new(r"\$\{\s*([\w-]+)\s*(?:\|([^}]*))?\}").ok())
        .as_ref()
}

/// Expands every `${...}` token in `raw` using the process environment.
pub fn interpolate_env(raw: &str) -> Cow<'_, str> {
    interpolate_with(raw, |name| std::env::var(name).ok())
}

/// Expands tokens with a custom variable lookup.
pub(crate) fn interpolate_with<F>(raw: &str, lookup: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    if !raw.contains("${") {
        return Cow::Borrowed(raw);
    }
    let Some(matcher) = env_token() else {
        return Cow::Borrowed(raw);
    };

    matcher.replace_all(raw, |caps: &Captures<'_>| {
        let name = &caps[1];
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            return value;
        }
        match caps.get(2) {
            Some(default) => default.as_str().trim().to_string(),
            None => caps[0].to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_vars<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_plain_string_is_borrowed() {
        let out = interpolate_with("no tokens here", with_vars(&[]));
        assert!(matches!(out, Cow::Borrowed("no tokens here")));
    }

    #[test]
    fn test_default_used_when_unset() {
        let out = interpolate_with("${NotExist|defValue}", with_vars(&[]));
        assert_eq!(out, "defValue");
    }

    #[test]
    fn test_set_variable_wins_over_default() {
        let out = interpolate_with("${NotExist|defValue}", with_vars(&[("NotExist", "X")]));
        assert_eq!(out, "X");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let out = interpolate_with("${ APP_ENV | prod }", with_vars(&[]));
        assert_eq!(out, "prod");
        let out = interpolate_with("${ APP_ENV }", with_vars(&[("APP_ENV", "dev")]));
        assert_eq!(out, "dev");
    }

    #[test]
    fn test_multiple_tokens() {
        let vars = [("GOPATH", "/go")];
        let out = interpolate_with("${GOPATH}/${APP_ENV | prod}/dir", with_vars(&vars));
        assert_eq!(out, "/go/prod/dir");
    }

    #[test]
    fn test_empty_variable_uses_default() {
        let out = interpolate_with("${EMPTY|fallback}", with_vars(&[("EMPTY", "")]));
        assert_eq!(out, "fallback");
    }

    #[test]
    fn test_unset_without_default_keeps_token() {
        let out = interpolate_with("home=${NO_SUCH_VAR}", with_vars(&[]));
        assert_eq!(out, "home=${NO_SUCH_VAR}");
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        let vars = [("A", "${B}"), ("B", "nope")];
        let out = interpolate_with("${A}", with_vars(&vars));
        assert_eq!(out, "${B}");
    }

    #[test]
    fn test_default_may_contain_punctuation() {
        let out = interpolate_with("${DSN|mysql://root:pw@127.0.0.1:3306/db?x=1}", with_vars(&[]));
        assert_eq!(out, "mysql://root:pw@127.0.0.1:3306/db?x=1");
    }

    #[test]
    fn test_names_with_dash() {
        let out = interpolate_with("${my-var}", with_vars(&[("my-var", "ok")]));
        assert_eq!(out, "ok");
    }
}
