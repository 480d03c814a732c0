//! Error types for the pve-lxc CLI.
//!
//! Uses thiserror for derive macros. Every variant is fatal to the run and
//! maps to its own exit code.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for pve-lxc operations.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// User provided invalid arguments or a file could not be read.
    #[error("{0}")]
    UserError(String),

    /// The container config is missing required fields or is malformed.
    #[error("invalid container config: {0}")]
    ValidationError(String),

    /// A mandatory credential is missing or cannot be used.
    #[error("invalid credentials: {0}")]
    CredentialError(String),

    /// The Proxmox API could not be reached or rejected authentication.
    #[error("cannot talk to the Proxmox API: {0}")]
    TransportError(String),

    /// The Proxmox API answered with a payload we cannot use.
    #[error("unexpected Proxmox API response: {0}")]
    ProtocolError(String),

    /// The creation task ran and stopped with a non-OK exit status.
    #[error("creation task {upid} failed: {exit_status}")]
    RemoteTaskFailure { upid: String, exit_status: String },

    /// The creation task did not finish within the poll budget.
    #[error("creation task {upid} still running after {attempts} status checks")]
    TimeoutError { upid: String, attempts: u32 },

    /// The creation was accepted but its result could not be observed.
    #[error("creation of container {vmid} on {node} was accepted but its outcome is unknown")]
    OutcomeUnknown { vmid: u32, node: String },
}

impl ProvisionError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::UserError(_) => exit_codes::USER_ERROR,
            ProvisionError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            ProvisionError::CredentialError(_) => exit_codes::CREDENTIAL_FAILURE,
            ProvisionError::TransportError(_) => exit_codes::TRANSPORT_FAILURE,
            ProvisionError::ProtocolError(_) => exit_codes::PROTOCOL_FAILURE,
            ProvisionError::RemoteTaskFailure { .. } => exit_codes::REMOTE_TASK_FAILURE,
            ProvisionError::TimeoutError { .. } => exit_codes::TIMEOUT,
            ProvisionError::OutcomeUnknown { .. } => exit_codes::OUTCOME_UNKNOWN,
        }
    }
}

/// Result type alias for pve-lxc operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
