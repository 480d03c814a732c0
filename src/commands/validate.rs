//! Implementation of the `pve-lxc validate` command.

use crate::cli::ValidateArgs;
use crate::config::ContainerSpec;
use crate::error::Result;

/// Execute the `pve-lxc validate` command.
///
/// Loads the config (which validates it) and prints what would be created.
/// No credentials are read and the cluster is never contacted.
pub fn cmd_validate(args: ValidateArgs) -> Result<()> {
    let spec = ContainerSpec::load(&args.config)?;
    tracing::debug!(config = %args.config.display(), "config is valid");

    for line in describe(&spec) {
        println!("{}", line);
    }
    Ok(())
}

fn describe(spec: &ContainerSpec) -> Vec<String> {
    let mut lines = vec!["Config OK".to_string()];

    lines.push(format!("Node:       {}", spec.node.as_deref().unwrap_or_default()));
    lines.push(format!(
        "Template:   {}",
        spec.template.as_deref().unwrap_or_default()
    ));
    if let Some(hostname) = &spec.hostname {
        lines.push(format!("Hostname:   {}", hostname));
    }
    lines.push(format!(
        "Memory:     {} MiB (+{} MiB swap), {} core(s)",
        spec.resources.memory.unwrap_or_default(),
        spec.resources.swap,
        spec.resources.cores
    ));
    lines.push(format!(
        "Root disk:  {}:{}",
        spec.storage.backend, spec.storage.size_gb
    ));
    lines.push(format!(
        "Interfaces: {}",
        spec.network_interfaces.len().max(1)
    ));
    if !spec.mount_points.is_empty() {
        lines.push(format!("Mounts:     {}", spec.mount_points.len()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
node: pve
template: local:vztmpl/debian-12-standard_12.2-1_amd64.tar.zst
hostname: web01
resources:
  memory: 2048
  cores: 2
mountPoints:
  - storage: tank
    sizeGB: 50
    path: /srv
"#;

    #[test]
    fn test_describe_summarizes_config() {
        let spec = ContainerSpec::from_yaml(CONFIG).unwrap();
        let lines = describe(&spec);

        assert_eq!(lines[0], "Config OK");
        assert!(lines.contains(&"Node:       pve".to_string()));
        assert!(lines.contains(&"Hostname:   web01".to_string()));
        assert!(lines.contains(&"Memory:     2048 MiB (+512 MiB swap), 2 core(s)".to_string()));
        assert!(lines.contains(&"Root disk:  local-lvm:8".to_string()));
        assert!(lines.contains(&"Interfaces: 1".to_string()));
        assert!(lines.contains(&"Mounts:     1".to_string()));
    }

    #[test]
    fn test_cmd_validate_accepts_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("web.yaml");
        std::fs::write(&path, CONFIG).unwrap();

        assert!(cmd_validate(ValidateArgs { config: path }).is_ok());
    }

    #[test]
    fn test_cmd_validate_reports_problems() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "node: pve\ntemplate: t\n").unwrap();

        let err = cmd_validate(ValidateArgs { config: path }).unwrap_err();
        assert_eq!(err.exit_code(), crate::exit_codes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_cmd_validate_missing_file_is_user_error() {
        let err = cmd_validate(ValidateArgs {
            config: PathBuf::from("/nonexistent/pve-lxc/web.yaml"),
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
    }
}
