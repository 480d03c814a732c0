//! Proxmox API value types and response decoding.
//!
//! Every Proxmox JSON response wraps its payload in `{"data": ...}`. The
//! helpers here unwrap that envelope and turn missing or malformed payloads
//! into `ProtocolError`.

use crate::error::{ProvisionError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Smallest vmid Proxmox hands out; 0-99 are reserved.
pub const MIN_VMID: u32 = 100;

/// Largest vmid Proxmox accepts.
pub const MAX_VMID: u32 = 999_999_999;

/// Status string for a task that is still executing.
pub const STATUS_RUNNING: &str = "running";

/// Status string for a task that has finished, successfully or not.
pub const STATUS_STOPPED: &str = "stopped";

/// Exit status Proxmox reports for a successful task.
pub const EXIT_OK: &str = "OK";

/// Cluster-unique container identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vmid(u32);

impl Vmid {
    /// Wrap a raw id, rejecting values Proxmox would refuse.
    pub fn new(id: u32) -> Result<Self> {
        if (MIN_VMID..=MAX_VMID).contains(&id) {
            Ok(Self(id))
        } else {
            Err(ProvisionError::UserError(format!(
                "vmid {} is out of range ({}-{})",
                id, MIN_VMID, MAX_VMID
            )))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Vmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to an asynchronous Proxmox task, scoped to the node running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub node: String,
    /// Unique process id, e.g. `UPID:pve:000A1B2C:...:vzcreate:101:root@pam!ci:`.
    pub upid: String,
}

/// Point-in-time status of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Running,
    /// Finished; carries the exit status when Proxmox reported one.
    Stopped { exit_status: Option<String> },
    /// Any status outside the known vocabulary.
    Unrecognized(String),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct RawTaskStatus {
    status: Option<String>,
    exitstatus: Option<String>,
}

fn envelope(body: &str) -> Result<Value> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| ProvisionError::ProtocolError(format!("response is not JSON: {}", e)))?;
    Ok(envelope.data)
}

/// Decode `GET /cluster/nextid`. Proxmox sends the id as a string, but a
/// bare number is accepted too.
pub fn parse_next_id(body: &str) -> Result<Vmid> {
    let raw = match envelope(body)? {
        Value::String(s) => s.trim().parse::<u32>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };

    let id = raw.ok_or_else(|| {
        ProvisionError::ProtocolError("next id response has no numeric id".to_string())
    })?;
    Vmid::new(id).map_err(|_| {
        ProvisionError::ProtocolError(format!("next id response has unusable id {}", id))
    })
}

/// Decode `POST /nodes/{node}/lxc`. Returns the task UPID, or `None` when
/// the API answered without one.
pub fn parse_create_response(body: &str) -> Result<Option<String>> {
    match envelope(body)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) if s.starts_with("UPID:") => Ok(Some(s)),
        other => Err(ProvisionError::ProtocolError(format!(
            "create response data is not a task id: {}",
            other
        ))),
    }
}

/// Decode `GET /nodes/{node}/tasks/{upid}/status`.
pub fn parse_task_status(body: &str) -> Result<TaskState> {
    let data = envelope(body)?;
    if data.is_null() {
        return Err(ProvisionError::ProtocolError(
            "task status response has no data".to_string(),
        ));
    }

    let raw: RawTaskStatus = serde_json::from_value(data).map_err(|e| {
        ProvisionError::ProtocolError(format!("task status response is malformed: {}", e))
    })?;
    let status = raw.status.ok_or_else(|| {
        ProvisionError::ProtocolError("task status response has no status".to_string())
    })?;

    Ok(match status.as_str() {
        STATUS_RUNNING => TaskState::Running,
        STATUS_STOPPED => TaskState::Stopped {
            exit_status: raw.exitstatus.filter(|s| !s.is_empty()),
        },
        _ => TaskState::Unrecognized(status),
    })
}
