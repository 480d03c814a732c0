//! ContainerSpec struct definition and default implementations.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Declarative description of one LXC container.
///
/// Parsed from the YAML file passed to `pve-lxc create`. Keys are camelCase.
/// `node`, `template`, and `resources.memory` are required but kept as
/// `Option` here so a missing value is reported by `validate()` together with
/// every other problem, instead of as a bare parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ContainerSpec {
    /// Proxmox node that will host the container.
    pub node: Option<String>,

    /// OS template volume, e.g. `local:vztmpl/debian-12-standard_12.2-1_amd64.tar.zst`.
    pub template: Option<String>,

    pub hostname: Option<String>,

    /// Root password, literal or `${VAR}` reference.
    pub password: Option<String>,

    pub ssh_keys: Option<SshKeys>,

    #[serde(deserialize_with = "null_as_default")]
    pub resources: Resources,

    #[serde(deserialize_with = "null_as_default")]
    pub storage: Storage,

    #[serde(deserialize_with = "null_as_default")]
    pub network_interfaces: Vec<NetworkInterface>,

    #[serde(deserialize_with = "null_as_default")]
    pub mount_points: Vec<MountPoint>,

    #[serde(deserialize_with = "null_as_default")]
    pub options: Options,

    #[serde(deserialize_with = "null_as_default")]
    pub dns: Dns,

    /// Proxmox tags, `;`-separated.
    pub tags: Option<String>,

    pub description: Option<String>,

    /// Resource pool to add the container to.
    pub pool: Option<String>,

    /// CPU architecture (`amd64`, `arm64`, ...).
    pub arch: Option<String>,

    /// OS type hint; Proxmox detects it from the template when unset.
    pub os_type: Option<String>,
}

/// CPU and memory allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Resources {
    /// Memory in MB. Required.
    pub memory: Option<u64>,

    /// Swap in MB.
    #[serde(default = "default_swap")]
    pub swap: u64,

    #[serde(default = "default_cores")]
    pub cores: u32,

    /// Upper CPU usage bound; 0 means unlimited.
    pub cpu_limit: Option<f64>,

    /// Relative CPU weight against other guests.
    #[serde(default = "default_cpu_units")]
    pub cpu_units: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            memory: None,
            swap: default_swap(),
            cores: default_cores(),
            cpu_limit: None,
            cpu_units: default_cpu_units(),
        }
    }
}

/// Root filesystem placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Storage {
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    #[serde(rename = "sizeGB", default = "default_root_size_gb")]
    pub size_gb: u32,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            size_gb: default_root_size_gb(),
        }
    }
}

/// One virtual network interface, serialized as `netN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct NetworkInterface {
    /// Interface name inside the container; `ethN` by position when unset.
    pub name: Option<String>,

    #[serde(default = "default_bridge")]
    pub bridge: String,

    /// `dhcp`, `manual`, or an `address/prefix` CIDR.
    #[serde(default = "default_ip")]
    pub ip: String,

    pub gateway: Option<String>,

    pub firewall: Option<bool>,

    /// 802.1Q VLAN tag.
    pub vlan: Option<u16>,

    pub mtu: Option<u16>,
}

impl Default for NetworkInterface {
    fn default() -> Self {
        Self {
            name: None,
            bridge: default_bridge(),
            ip: default_ip(),
            gateway: None,
            firewall: None,
            vlan: None,
            mtu: None,
        }
    }
}

/// An extra volume mounted into the container, serialized as `mpN`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MountPoint {
    pub storage: Option<String>,

    #[serde(rename = "sizeGB")]
    pub size_gb: Option<u32>,

    /// Absolute mount path inside the container.
    pub path: Option<String>,

    /// Whether the volume is included in backups.
    pub backup: Option<bool>,
}

/// Boolean container options. Always sent, even when left at their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    #[serde(default = "default_true")]
    pub unprivileged: bool,

    pub on_boot: bool,

    /// Start the container once creation finishes.
    pub start: bool,

    pub protection: bool,

    #[serde(deserialize_with = "null_as_default")]
    pub features: Features,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            unprivileged: default_true(),
            on_boot: false,
            start: false,
            protection: false,
            features: Features::default(),
        }
    }
}

/// Optional LXC feature flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Features {
    pub nesting: Option<bool>,
    pub keyctl: Option<bool>,
    pub fuse: Option<bool>,
}

/// DNS overrides; the host's settings are used when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Dns {
    pub nameserver: Option<String>,
    pub search_domain: Option<String>,
}
