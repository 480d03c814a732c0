//! Parser for `KEY=value` env files.
//!
//! Accepts the subset of shell syntax people put in `.env` files: blank lines,
//! `#` comment lines, an optional `export ` prefix, and single- or
//! double-quoted values. Quoting is resolved with `shell-words`; the file is
//! never executed.

use crate::error::{ProvisionError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid env key regex"));

/// Parse env file content into a key/value map. Later keys win.
///
/// A value must be a single shell word: `A=a b` is rejected, `A="a b"` is not.
///
/// Errors name the offending line number but never echo the line itself,
/// since it may hold a secret.
pub fn parse_env_file(content: &str) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();

        let Some((key, value)) = line.split_once('=') else {
            return Err(ProvisionError::CredentialError(format!(
                "env file line {}: expected KEY=value",
                line_no
            )));
        };

        let key = key.trim();
        if !KEY_REGEX.is_match(key) {
            return Err(ProvisionError::CredentialError(format!(
                "env file line {}: '{}' is not a valid variable name",
                line_no, key
            )));
        }

        let mut words = shell_words::split(value.trim()).map_err(|_| {
            ProvisionError::CredentialError(format!(
                "env file line {}: unbalanced quotes in value of {}",
                line_no, key
            ))
        })?;

        if words.len() > 1 {
            return Err(ProvisionError::CredentialError(format!(
                "env file line {}: value of {} has unquoted whitespace; quote it",
                line_no, key
            )));
        }
        let value = words.pop().unwrap_or_default();
        vars.insert(key.to_string(), value);
    }

    Ok(vars)
}
