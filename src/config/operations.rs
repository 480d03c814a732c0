//! ContainerSpec loading and validation.

use super::model::{ContainerSpec, NetworkInterface};
use super::types::{IP_DHCP, IP_MANUAL};
use crate::error::{ProvisionError, Result};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::Path;

/// Largest `cpuunits` value Proxmox accepts.
const MAX_CPU_UNITS: u32 = 500_000;

/// Largest `cpulimit` value Proxmox accepts.
const MAX_CPU_LIMIT: f64 = 8192.0;

impl ContainerSpec {
    /// Load a container config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(ContainerSpec)` - Successfully loaded and validated config
    /// * `Err(ProvisionError::UserError)` - The file could not be read
    /// * `Err(ProvisionError::ValidationError)` - Parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::UserError(format!(
                "failed to read container config '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate a container config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let spec: ContainerSpec = serde_yaml::from_str(yaml)
            .map_err(|e| ProvisionError::ValidationError(format!("failed to parse YAML: {}", e)))?;

        spec.validate()?;
        Ok(spec)
    }

    /// Validate the config as a whole.
    ///
    /// Every problem found is reported in a single `ValidationError`, joined
    /// with `; `, so one run surfaces all of them.
    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ProvisionError::ValidationError(problems.join("; ")))
        }
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if is_blank(self.node.as_deref()) {
            problems.push("node is required".to_string());
        }
        if is_blank(self.template.as_deref()) {
            problems.push("template is required".to_string());
        }

        let resources = &self.resources;
        match resources.memory {
            None => problems.push("resources.memory is required".to_string()),
            Some(0) => problems.push("resources.memory must be greater than 0".to_string()),
            Some(_) => {}
        }
        if resources.cores == 0 {
            problems.push("resources.cores must be greater than 0".to_string());
        }
        if resources.cpu_units == 0 || resources.cpu_units > MAX_CPU_UNITS {
            problems.push(format!(
                "resources.cpuUnits must be between 1 and {}",
                MAX_CPU_UNITS
            ));
        }
        if let Some(limit) = resources.cpu_limit {
            if !(0.0..=MAX_CPU_LIMIT).contains(&limit) {
                problems.push(format!(
                    "resources.cpuLimit must be between 0 and {}",
                    MAX_CPU_LIMIT
                ));
            }
        }

        if self.storage.backend.trim().is_empty() {
            problems.push("storage.backend must not be empty".to_string());
        }
        if self.storage.size_gb == 0 {
            problems.push("storage.sizeGB must be greater than 0".to_string());
        }

        let mut names = BTreeSet::new();
        for (i, nic) in self.network_interfaces.iter().enumerate() {
            let field = format!("networkInterfaces[{}]", i);
            let name = nic.resolved_name(i);
            if name.trim().is_empty() {
                problems.push(format!("{}.name must not be empty", field));
            } else if !names.insert(name.clone()) {
                problems.push(format!("{}.name '{}' is used more than once", field, name));
            }
            if nic.bridge.trim().is_empty() {
                problems.push(format!("{}.bridge must not be empty", field));
            }
            let address = nic.static_address();
            if nic.ip != IP_DHCP && nic.ip != IP_MANUAL && address.is_none() {
                problems.push(format!(
                    "{}.ip must be 'dhcp', 'manual', or an address/prefix (found '{}')",
                    field, nic.ip
                ));
            }
            if let Some(gateway) = &nic.gateway {
                match (gateway.parse::<IpAddr>(), address) {
                    (Err(_), _) => problems.push(format!(
                        "{}.gateway is not an IP address (found '{}')",
                        field, gateway
                    )),
                    (Ok(gw), Some(addr)) if gw.is_ipv4() != addr.is_ipv4() => {
                        problems.push(format!(
                            "{}.gateway '{}' is not in the same address family as ip '{}'",
                            field, gateway, nic.ip
                        ))
                    }
                    _ => {}
                }
            }
            if let Some(vlan) = nic.vlan {
                if !(1..=4094).contains(&vlan) {
                    problems.push(format!("{}.vlan must be between 1 and 4094", field));
                }
            }
        }

        for (i, mp) in self.mount_points.iter().enumerate() {
            let field = format!("mountPoints[{}]", i);
            if is_blank(mp.storage.as_deref()) {
                problems.push(format!("{}.storage is required", field));
            }
            match mp.size_gb {
                None => problems.push(format!("{}.sizeGB is required", field)),
                Some(0) => problems.push(format!("{}.sizeGB must be greater than 0", field)),
                Some(_) => {}
            }
            match mp.path.as_deref() {
                None => problems.push(format!("{}.path is required", field)),
                Some(path) if !path.starts_with('/') => problems.push(format!(
                    "{}.path must be absolute (found '{}')",
                    field, path
                )),
                Some(_) => {}
            }
        }

        problems
    }
}

impl NetworkInterface {
    /// Interface name, falling back to `eth{index}` for unnamed entries.
    pub fn resolved_name(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("eth{}", index))
    }

    /// The address part of a static `address/prefix` setting.
    ///
    /// `None` for `dhcp`, `manual`, and anything that is not a valid CIDR.
    pub fn static_address(&self) -> Option<IpAddr> {
        parse_cidr(&self.ip)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Parse `address/prefix`, requiring a prefix that fits the address family.
fn parse_cidr(value: &str) -> Option<IpAddr> {
    let (addr, prefix) = value.split_once('/')?;
    let prefix = prefix.parse::<u8>().ok()?;
    let addr = addr.parse::<IpAddr>().ok()?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    (prefix <= max).then_some(addr)
}
