use crate::env::Environment;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").expect("variable pattern is valid")
});

/// Substitutes `$NAME` and `${NAME}` in `token` from `env`.
///
/// Unknown names become the empty string. Substituted text is not scanned
/// again, and a `$` that does not start a name is kept literally.
pub fn expand_variables(token: &str, env: &Environment) -> String {
    expand_variables_with(token, |name| env.get_var(name))
}

/// Same as [`expand_variables`] with an arbitrary lookup.
pub fn expand_variables_with<F>(token: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !token.contains('$') {
        return token.to_string();
    }
    VARIABLE
        .replace_all(token, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            lookup(name).unwrap_or_default()
        })
        .into_owned()
}
