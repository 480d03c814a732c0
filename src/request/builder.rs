//! Request builder: `ContainerSpec` + vmid + secrets -> `CreationRequest`.

use super::CreationRequest;
use super::interpolate::{resolve, resolve_opt};
use crate::api::Vmid;
use crate::config::{ContainerSpec, Features, MountPoint, NetworkInterface};
use crate::credentials::CredentialContext;
use crate::error::{ProvisionError, Result};
use std::net::IpAddr;

/// `net0` value used when the config lists no interfaces.
pub const DEFAULT_NET0: &str = "name=eth0,bridge=vmbr0,ip=dhcp";

/// Build the creation parameters for `spec`.
///
/// Required fields are copied verbatim, optional fields are omitted when
/// absent (never sent as `key=`), and the four boolean options are always
/// sent. The output depends only on the inputs.
///
/// # Returns
///
/// * `Ok(CreationRequest)` - Parameters ready to submit
/// * `Err(ProvisionError::ValidationError)` - Spec is missing required fields or is malformed
pub fn build(spec: &ContainerSpec, vmid: Vmid, secrets: &CredentialContext) -> Result<CreationRequest> {
    spec.validate()?;

    let template = spec
        .template
        .as_deref()
        .ok_or_else(|| ProvisionError::ValidationError("template is required".to_string()))?;
    let memory = spec
        .resources
        .memory
        .ok_or_else(|| ProvisionError::ValidationError("resources.memory is required".to_string()))?;

    let mut params = Params::default();

    params.push("vmid", vmid.to_string());
    params.push("ostemplate", template);
    params.push_opt("hostname", resolve_opt(spec.hostname.as_deref(), secrets));
    params.push_opt("password", resolve_opt(spec.password.as_deref(), secrets));
    params.push_opt("ssh-public-keys", ssh_public_keys(spec, secrets));

    let resources = &spec.resources;
    params.push("memory", memory.to_string());
    params.push("swap", resources.swap.to_string());
    params.push("cores", resources.cores.to_string());
    params.push_opt("cpulimit", resources.cpu_limit.map(|l| l.to_string()));
    params.push("cpuunits", resources.cpu_units.to_string());

    params.push(
        "rootfs",
        format!("{}:{}", spec.storage.backend, spec.storage.size_gb),
    );

    if spec.network_interfaces.is_empty() {
        params.push("net0", DEFAULT_NET0);
    } else {
        for (i, nic) in spec.network_interfaces.iter().enumerate() {
            params.push(format!("net{}", i), net_value(nic, i));
        }
    }

    for (i, mp) in spec.mount_points.iter().enumerate() {
        params.push(format!("mp{}", i), mount_point_value(mp)?);
    }

    let options = &spec.options;
    params.push("unprivileged", options.unprivileged.to_string());
    params.push("onboot", options.on_boot.to_string());
    params.push("start", options.start.to_string());
    params.push("protection", options.protection.to_string());
    params.push_opt("features", features_value(&options.features));

    params.push_opt("nameserver", resolve_opt(spec.dns.nameserver.as_deref(), secrets));
    params.push_opt(
        "searchdomain",
        resolve_opt(spec.dns.search_domain.as_deref(), secrets),
    );
    params.push_opt("tags", resolve_opt(spec.tags.as_deref(), secrets));
    params.push_opt("description", resolve_opt(spec.description.as_deref(), secrets));
    params.push_opt("pool", resolve_opt(spec.pool.as_deref(), secrets));
    params.push_opt("arch", resolve_opt(spec.arch.as_deref(), secrets));
    params.push_opt("ostype", resolve_opt(spec.os_type.as_deref(), secrets));

    Ok(CreationRequest::new(params.0))
}

#[derive(Default)]
struct Params(Vec<(String, String)>);

impl Params {
    fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    fn push_opt(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }
}

/// One key per line. Each entry may be a `${VAR}` holding one or more keys.
fn ssh_public_keys(spec: &ContainerSpec, secrets: &CredentialContext) -> Option<String> {
    let keys = spec.ssh_keys.as_ref()?;
    let resolved: Vec<String> = keys
        .keys()
        .into_iter()
        .filter_map(|key| resolve(key, secrets))
        .flat_map(|value| {
            value
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();

    if resolved.is_empty() {
        None
    } else {
        Some(resolved.join("\n"))
    }
}

/// `name=..,bridge=..,ip=..[,gw=..][,firewall=..][,tag=..][,mtu=..]`
///
/// IPv6 addresses go in `ip6=`/`gw6=`; Proxmox only takes IPv4 in `ip=`/`gw=`.
/// A gateway is only sent alongside a static address.
fn net_value(nic: &NetworkInterface, index: usize) -> String {
    let mut parts = vec![
        format!("name={}", nic.resolved_name(index)),
        format!("bridge={}", nic.bridge),
    ];
    let (ip_key, gw_key) = match nic.static_address() {
        Some(IpAddr::V6(_)) => ("ip6", "gw6"),
        _ => ("ip", "gw"),
    };
    parts.push(format!("{}={}", ip_key, nic.ip));
    if let (Some(_), Some(gateway)) = (nic.static_address(), &nic.gateway) {
        parts.push(format!("{}={}", gw_key, gateway));
    }
    if let Some(firewall) = nic.firewall {
        parts.push(format!("firewall={}", flag(firewall)));
    }
    if let Some(vlan) = nic.vlan {
        parts.push(format!("tag={}", vlan));
    }
    if let Some(mtu) = nic.mtu {
        parts.push(format!("mtu={}", mtu));
    }
    parts.join(",")
}

/// `storage:sizeGB,mp=path[,backup=..]`
fn mount_point_value(mp: &MountPoint) -> Result<String> {
    let (Some(storage), Some(size_gb), Some(path)) = (&mp.storage, mp.size_gb, &mp.path) else {
        return Err(ProvisionError::ValidationError(
            "mount point needs storage, sizeGB, and path".to_string(),
        ));
    };

    let mut value = format!("{}:{},mp={}", storage, size_gb, path);
    if let Some(backup) = mp.backup {
        value.push_str(&format!(",backup={}", flag(backup)));
    }
    Ok(value)
}

/// `nesting=1,keyctl=1,fuse=0`, or `None` when no flag is set.
fn features_value(features: &Features) -> Option<String> {
    let parts: Vec<String> = [
        ("nesting", features.nesting),
        ("keyctl", features.keyctl),
        ("fuse", features.fuse),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| format!("{}={}", name, flag(v))))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

/// Proxmox property strings spell booleans as `1`/`0`.
fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
