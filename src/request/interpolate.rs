//! `${NAME}` secret references in config string fields.

use crate::credentials::CredentialContext;
use regex::Regex;
use std::sync::LazyLock;

/// A value that is exactly one reference, nothing before or after it.
static REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("Invalid secret reference regex")
});

/// Resolve a config string against the secret variables.
///
/// Literal strings come back unchanged. A `${NAME}` reference resolves to the
/// variable's value, or to `None` when the variable is unset so the caller
/// omits the field. Empty results are also `None`: an empty parameter is
/// never sent.
pub fn resolve(value: &str, secrets: &CredentialContext) -> Option<String> {
    let resolved = match REFERENCE_REGEX.captures(value) {
        Some(caps) => secrets.var(&caps[1])?.to_string(),
        None => value.to_string(),
    };

    if resolved.trim().is_empty() {
        None
    } else {
        Some(resolved)
    }
}

/// `resolve` lifted over an optional field.
pub fn resolve_opt(value: Option<&str>, secrets: &CredentialContext) -> Option<String> {
    value.and_then(|v| resolve(v, secrets))
}
