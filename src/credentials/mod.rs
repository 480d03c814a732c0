//! API credentials and secret variables.
//!
//! `CredentialContext` is built once at startup from the process environment
//! overlaid with an optional env file, then passed by reference to everything
//! that needs it. Secret values live in `SecretString` so they never show up
//! in `Debug` output or logs.

mod env_file;


pub use env_file::parse_env_file;

use crate::error::{ProvisionError, Result};
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use url::Url;

pub const HOST_VAR: &str = "PROXMOX_HOST";
pub const USER_VAR: &str = "PROXMOX_USER";
pub const TOKEN_NAME_VAR: &str = "PROXMOX_TOKEN_NAME";
pub const TOKEN_SECRET_VAR: &str = "PROXMOX_TOKEN_SECRET";

/// Set to `1`/`true`/`yes` to skip TLS certificate verification.
pub const INSECURE_VAR: &str = "PROXMOX_INSECURE";

/// Port the Proxmox API listens on when the host does not name one.
pub const DEFAULT_API_PORT: u16 = 8006;

/// Credentials for the Proxmox API plus named secrets for `${NAME}` lookups.
pub struct CredentialContext {
    base_url: String,
    user: String,
    token_name: String,
    token_secret: SecretString,
    insecure: bool,
    vars: BTreeMap<String, SecretString>,
}

impl CredentialContext {
    /// Load credentials from the process environment and an optional env file.
    ///
    /// Values from the env file take precedence over the environment, the
    /// same as sourcing the file in a shell would.
    ///
    /// # Returns
    ///
    /// * `Ok(CredentialContext)` - All mandatory fields present and usable
    /// * `Err(ProvisionError::CredentialError)` - Missing field, unreadable or malformed env file
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let mut vars: BTreeMap<String, String> = std::env::vars().collect();

        if let Some(path) = env_file {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ProvisionError::CredentialError(format!(
                    "failed to read env file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            vars.extend(parse_env_file(&content)?);
        }

        Self::from_vars(vars)
    }

    /// Build credentials from an already merged variable map.
    pub fn from_vars(vars: BTreeMap<String, String>) -> Result<Self> {
        let host = required(&vars, HOST_VAR)?;
        let user = required(&vars, USER_VAR)?;
        let token_name = required(&vars, TOKEN_NAME_VAR)?;
        let token_secret = required(&vars, TOKEN_SECRET_VAR)?;

        if !user.contains('@') || user.contains('!') {
            return Err(ProvisionError::CredentialError(format!(
                "{} must look like user@realm (found '{}')",
                USER_VAR, user
            )));
        }
        if token_name.contains('!') || token_name.contains('=') {
            return Err(ProvisionError::CredentialError(format!(
                "{} must not contain '!' or '='",
                TOKEN_NAME_VAR
            )));
        }

        let base_url = api_base_url(&host)?;
        let insecure = vars
            .get(INSECURE_VAR)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            base_url,
            user,
            token_name,
            token_secret: SecretString::from(token_secret),
            insecure,
            vars: vars
                .into_iter()
                .map(|(k, v)| (k, SecretString::from(v)))
                .collect(),
        })
    }

    /// API root, e.g. `https://pve.lan:8006/api2/json`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn token_name(&self) -> &str {
        &self.token_name
    }

    /// Whether TLS certificate verification is disabled.
    pub fn insecure(&self) -> bool {
        self.insecure
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> SecretString {
        SecretString::from(format!(
            "PVEAPIToken={}!{}={}",
            self.user,
            self.token_name,
            self.token_secret.expose_secret()
        ))
    }

    /// Look up a named secret for `${NAME}` interpolation.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|v| v.expose_secret())
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("token_name", &self.token_name)
            .field("token_secret", &"[REDACTED]")
            .field("insecure", &self.insecure)
            .field("vars", &self.vars.len())
            .finish()
    }
}

fn required(vars: &BTreeMap<String, String>, key: &str) -> Result<String> {
    match vars.get(key).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ProvisionError::CredentialError(format!(
            "{} is not set",
            key
        ))),
    }
}

/// Normalize `host`, `host:port`, or a full URL into the API root.
fn api_base_url(host: &str) -> Result<String> {
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| {
        ProvisionError::CredentialError(format!("{} is not a valid host: {}", HOST_VAR, e))
    })?;
    if url.host_str().is_none() {
        return Err(ProvisionError::CredentialError(format!(
            "{} has no host name",
            HOST_VAR
        )));
    }
    if url.port().is_none() && !host.contains("://") {
        url.set_port(Some(DEFAULT_API_PORT)).map_err(|_| {
            ProvisionError::CredentialError(format!("{} cannot take a port", HOST_VAR))
        })?;
    }

    Ok(format!("{}/api2/json", url.origin().ascii_serialization()))
}
