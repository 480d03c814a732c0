//! Configuration types and defaults for container configs.
//!
//! This module defines the small value types, constants, and default value
//! functions used by the `ContainerSpec` struct.

use serde::{Deserialize, Deserializer, Serialize};

/// IP setting that asks the container to use DHCP.
pub const IP_DHCP: &str = "dhcp";

/// IP setting that leaves addressing to the container itself.
pub const IP_MANUAL: &str = "manual";

/// SSH public keys, either as one (possibly multi-line) block or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SshKeys {
    /// A YAML string, usually a `|` block with one key per line.
    Block(String),
    /// A YAML sequence with one key per entry.
    List(Vec<String>),
}

impl SshKeys {
    /// Individual keys, trimmed, with blank lines dropped.
    ///
    /// A list entry may itself contain several lines; each line counts as
    /// one key.
    pub fn keys(&self) -> Vec<&str> {
        let entries: Vec<&str> = match self {
            SshKeys::Block(block) => vec![block.as_str()],
            SshKeys::List(list) => list.iter().map(String::as_str).collect(),
        };
        entries
            .into_iter()
            .flat_map(str::lines)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Treat an explicit YAML `null` the same as an absent key.
///
/// Lets `storage:` or `networkInterfaces:` with nothing after them fall back
/// to their defaults instead of failing the parse.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Default value functions for serde
pub(crate) fn default_swap() -> u64 {
    512
}
pub(crate) fn default_cores() -> u32 {
    1
}
pub(crate) fn default_cpu_units() -> u32 {
    1024
}
pub(crate) fn default_storage_backend() -> String {
    "local-lvm".to_string()
}
pub(crate) fn default_root_size_gb() -> u32 {
    8
}
pub(crate) fn default_bridge() -> String {
    "vmbr0".to_string()
}
pub(crate) fn default_ip() -> String {
    IP_DHCP.to_string()
}
pub(crate) fn default_true() -> bool {
    true
}
