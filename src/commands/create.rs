//! Implementation of the `pve-lxc create` command.

use crate::api::{HttpApi, Vmid};
use crate::cli::CreateArgs;
use crate::config::ContainerSpec;
use crate::credentials::CredentialContext;
use crate::error::{ProvisionError, Result};
use crate::poller::{Outcome, PollPolicy};
use crate::provision::{ProvisionOptions, ProvisionReport, provision};
use std::time::Duration;

/// Execute the `pve-lxc create` command.
///
/// The config is loaded and validated before credentials are read, so a bad
/// config never touches the environment or the network.
pub fn cmd_create(args: CreateArgs) -> Result<()> {
    let spec = ContainerSpec::load(&args.config)?;
    let credentials = CredentialContext::load(args.env_file.as_deref())?;
    tracing::debug!(?credentials, "credentials loaded");

    let api = HttpApi::new(&credentials)?;
    let options = ProvisionOptions {
        vmid: args.vmid.map(Vmid::new).transpose()?,
        dry_run: args.dry_run,
        poll: PollPolicy {
            interval: Duration::from_secs(args.poll_interval),
            max_attempts: args.max_attempts,
        },
        progress: !args.json,
    };

    let report = provision(&spec, &credentials, &api, &options, &mut std::thread::sleep)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report.summary()).map_err(|e| {
            ProvisionError::UserError(format!("failed to serialize summary: {}", e))
        })?;
        println!("{}", json);
    } else {
        for line in render_text(&report) {
            println!("{}", line);
        }
    }

    report.into_result().map(|_| ())
}

/// Human-readable summary lines for a finished run.
fn render_text(report: &ProvisionReport) -> Vec<String> {
    let mut lines = Vec::new();

    match &report.outcome {
        None => {
            lines.push(format!(
                "Dry run: would create container {} on node {}",
                report.vmid, report.node
            ));
            lines.push("Parameters:".to_string());
            lines.extend(
                report
                    .request
                    .redacted_lines()
                    .into_iter()
                    .map(|l| format!("  {}", l)),
            );
        }
        Some(Outcome::Success) => {
            lines.push(format!(
                "Container {} created on node {}",
                report.vmid, report.node
            ));
        }
        Some(Outcome::Failure(_)) | Some(Outcome::Unknown) => {
            // The error printed by main carries the detail.
            lines.push(format!(
                "Container {} on node {} was not confirmed",
                report.vmid, report.node
            ));
        }
    }

    if let Some(upid) = &report.upid {
        lines.push(format!("Task:      {}", upid));
    }
    let elapsed = report.finished_at - report.started_at;
    if report.outcome.is_some() {
        lines.push(format!("Elapsed:   {}s", elapsed.num_seconds()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TaskState;
    use crate::test_support::{FakeApi, SleepRecorder, TEST_UPID, credentials_with, stopped};

    const MINIMAL: &str = "node: pve\ntemplate: local:vztmpl/x.tar.zst\nresources:\n  memory: 1024\npassword: hunter2\n";

    fn run(api: &FakeApi, dry_run: bool) -> ProvisionReport {
        let spec = ContainerSpec::from_yaml(MINIMAL).unwrap();
        let options = ProvisionOptions {
            dry_run,
            ..Default::default()
        };
        let mut sleeps = SleepRecorder::default();
        provision(&spec, &credentials_with(&[]), api, &options, &mut sleeps.sleeper()).unwrap()
    }

    #[test]
    fn test_render_success() {
        let api = FakeApi::new(vec![TaskState::Running, stopped("OK")]);
        let lines = render_text(&run(&api, false));

        assert_eq!(lines[0], "Container 104 created on node pve");
        assert_eq!(lines[1], format!("Task:      {}", TEST_UPID));
        assert!(lines[2].starts_with("Elapsed:"));
    }

    #[test]
    fn test_render_dry_run_lists_redacted_parameters() {
        let api = FakeApi::new(vec![]);
        let lines = render_text(&run(&api, true));

        assert_eq!(lines[0], "Dry run: would create container 104 on node pve");
        assert!(lines.contains(&"  password=********".to_string()));
        assert!(lines.contains(&"  memory=1024".to_string()));
        assert!(lines.iter().all(|l| !l.contains("hunter2")));
        assert!(lines.iter().all(|l| !l.starts_with("Task:")));
    }

    #[test]
    fn test_render_unconfirmed() {
        let api = FakeApi::new(vec![]).without_task();
        let lines = render_text(&run(&api, false));

        assert_eq!(lines[0], "Container 104 on node pve was not confirmed");
        assert!(lines.iter().all(|l| !l.starts_with("Task:")));
    }
}
