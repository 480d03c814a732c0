//! End-to-end container creation.
//!
//! Strict order, each step fatal on failure and never retried:
//! validate config -> allocate vmid -> build request -> submit -> poll task.
//! Nothing is rolled back; a half-created container is removed out of band.

#[cfg(test)]
mod tests;

use crate::api::{ProxmoxApi, Vmid};
use crate::config::ContainerSpec;
use crate::credentials::CredentialContext;
use crate::error::{ProvisionError, Result};
use crate::poller::{Outcome, PollPolicy, await_completion};
use crate::request::{CreationRequest, build};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Knobs for one provisioning run.
#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    /// Use this vmid instead of asking the cluster for the next free one.
    pub vmid: Option<Vmid>,
    /// Stop after building the request; nothing is created.
    pub dry_run: bool,
    pub poll: PollPolicy,
    /// Print step-by-step progress to stdout.
    pub progress: bool,
}

/// What happened during a run.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub vmid: Vmid,
    pub node: String,
    pub request: CreationRequest,
    /// Task id, when the creation call started one.
    pub upid: Option<String>,
    /// `None` for dry runs.
    pub outcome: Option<Outcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Serializable view of a report for `--json` output.
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub vmid: u32,
    pub node: &'a str,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'a Outcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ProvisionReport {
    pub fn summary(&self) -> ReportSummary<'_> {
        let dry_run = self.outcome.is_none();
        ReportSummary {
            vmid: self.vmid.get(),
            node: &self.node,
            dry_run,
            upid: self.upid.as_deref(),
            outcome: self.outcome.as_ref(),
            parameters: if dry_run {
                self.request.redacted_lines()
            } else {
                Vec::new()
            },
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Turn a failed or unverifiable outcome into the matching error.
    ///
    /// Dry runs and verified successes are `Ok`.
    pub fn into_result(self) -> Result<Self> {
        let err = match &self.outcome {
            None | Some(Outcome::Success) => None,
            Some(Outcome::Failure(exit_status)) => Some(ProvisionError::RemoteTaskFailure {
                upid: self.upid.clone().unwrap_or_default(),
                exit_status: exit_status.clone(),
            }),
            Some(Outcome::Unknown) => Some(ProvisionError::OutcomeUnknown {
                vmid: self.vmid.get(),
                node: self.node.clone(),
            }),
        };

        match err {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Create one container described by `spec`.
///
/// The config is validated before any API call is made. `sleep` is handed to
/// the poller; production passes `std::thread::sleep`.
pub fn provision(
    spec: &ContainerSpec,
    credentials: &CredentialContext,
    api: &dyn ProxmoxApi,
    options: &ProvisionOptions,
    sleep: &mut dyn FnMut(Duration),
) -> Result<ProvisionReport> {
    let started_at = Utc::now();
    spec.validate()?;

    let node = spec
        .node
        .clone()
        .ok_or_else(|| ProvisionError::ValidationError("node is required".to_string()))?;

    let vmid = match options.vmid {
        Some(vmid) => {
            tracing::debug!(%vmid, "using vmid from command line");
            vmid
        }
        None => {
            let vmid = api.next_id()?;
            tracing::debug!(%vmid, "allocated vmid");
            vmid
        }
    };

    let request = build(spec, vmid, credentials)?;
    tracing::debug!(count = request.params().len(), "creation request built");
    for line in request.redacted_lines() {
        tracing::debug!(param = %line, "request parameter");
    }

    if options.dry_run {
        return Ok(ProvisionReport {
            vmid,
            node,
            request,
            upid: None,
            outcome: None,
            started_at,
            finished_at: Utc::now(),
        });
    }

    if options.progress {
        println!("Creating container {} on node {}...", vmid, node);
    }
    let handle = api.create_container(&node, &request)?;

    let (upid, outcome) = match handle {
        Some(handle) => {
            if options.progress {
                println!("Waiting for task {}", handle.upid);
            }
            let outcome = await_completion(api, &handle, &options.poll, sleep)?;
            (Some(handle.upid), outcome)
        }
        None => {
            tracing::warn!(%vmid, %node, "creation returned no task id; outcome cannot be verified");
            (None, Outcome::Unknown)
        }
    };

    Ok(ProvisionReport {
        vmid,
        node,
        request,
        upid,
        outcome: Some(outcome),
        started_at,
        finished_at: Utc::now(),
    })
}
