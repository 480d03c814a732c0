//! Exit code constants for the pve-lxc CLI.
//!
//! Each failure class gets its own code so wrapper scripts can branch on it:
//! - 0: Success (creation task verified as finished OK)
//! - 1: User error (bad args, unreadable files)
//! - 2: Validation failure (container config missing or malformed)
//! - 3: Credential failure (missing or invalid API credentials)
//! - 4: Transport failure (connection or authentication)
//! - 5: Protocol failure (unexpected or unparseable API response)
//! - 6: Remote task failure (Proxmox task ended with an error)
//! - 7: Timeout (task still not finished after the poll budget)
//! - 8: Outcome unknown (creation accepted but not verifiable)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or files that cannot be read.
pub const USER_ERROR: i32 = 1;

/// Validation failure: container config is missing required fields or is malformed.
pub const VALIDATION_FAILURE: i32 = 2;

/// Credential failure: a mandatory API credential is missing or unusable.
pub const CREDENTIAL_FAILURE: i32 = 3;

/// Transport failure: connection refused, TLS failure, or authentication rejected.
pub const TRANSPORT_FAILURE: i32 = 4;

/// Protocol failure: the API answered, but not with something usable.
pub const PROTOCOL_FAILURE: i32 = 5;

/// Remote task failure: the creation task stopped with a non-OK exit status.
pub const REMOTE_TASK_FAILURE: i32 = 6;

/// Timeout: the creation task did not reach a terminal state in time.
pub const TIMEOUT: i32 = 7;

/// Outcome unknown: the creation was accepted but its result could not be observed.
pub const OUTCOME_UNKNOWN: i32 = 8;
