//! Task completion tracking.
//!
//! Proxmox only exposes point-in-time task status, so completion is observed
//! by polling: `running` waits one interval and asks again, `stopped` is
//! terminal. Statuses outside that vocabulary are logged and polled again
//! rather than aborting the run. The loop is bounded by `max_attempts`.


use crate::api::{EXIT_OK, ProxmoxApi, TaskHandle, TaskState};
use crate::error::{ProvisionError, Result};
use serde::Serialize;
use std::time::Duration;

/// Default wait between two status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of status checks before giving up (10 minutes at 2s).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 300;

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Status checks allowed before `TimeoutError`.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Final classification of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// Stopped with exit status `OK`.
    Success,
    /// Stopped with any other exit status, carried verbatim.
    Failure(String),
    /// Stopped without an exit status, or never observed.
    Unknown,
}

impl Outcome {
    fn from_exit_status(exit_status: Option<String>) -> Self {
        match exit_status {
            Some(s) if s == EXIT_OK => Outcome::Success,
            Some(s) => Outcome::Failure(s),
            None => Outcome::Unknown,
        }
    }
}

/// Poll `handle` until it stops or the attempt budget runs out.
///
/// `sleep` is called once between consecutive status checks and never after
/// the last one. Errors from the API abort immediately; nothing is retried.
///
/// # Returns
///
/// * `Ok(Outcome)` - The task reached `stopped`
/// * `Err(ProvisionError::TimeoutError)` - Still not stopped after `max_attempts` checks
/// * `Err(_)` - Transport or protocol failure while polling
pub fn await_completion(
    api: &dyn ProxmoxApi,
    handle: &TaskHandle,
    policy: &PollPolicy,
    sleep: &mut dyn FnMut(Duration),
) -> Result<Outcome> {
    for attempt in 1..=policy.max_attempts {
        match api.task_status(handle)? {
            TaskState::Stopped { exit_status } => {
                tracing::debug!(upid = %handle.upid, attempt, ?exit_status, "task stopped");
                return Ok(Outcome::from_exit_status(exit_status));
            }
            TaskState::Running => {
                tracing::debug!(upid = %handle.upid, attempt, "task running");
            }
            TaskState::Unrecognized(status) => {
                tracing::warn!(
                    upid = %handle.upid,
                    attempt,
                    %status,
                    "unrecognized task status, polling again"
                );
            }
        }

        if attempt < policy.max_attempts {
            sleep(policy.interval);
        }
    }

    Err(ProvisionError::TimeoutError {
        upid: handle.upid.clone(),
        attempts: policy.max_attempts,
    })
}
