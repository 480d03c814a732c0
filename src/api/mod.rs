//! Proxmox VE API access.
//!
//! The `ProxmoxApi` trait is the seam between orchestration and the network:
//! `HttpApi` talks to a real cluster over blocking HTTPS, tests plug in a
//! scripted fake.

mod http;
mod types;


pub use http::HttpApi;
pub use types::{EXIT_OK, TaskHandle, TaskState, Vmid};

use crate::error::Result;
use crate::request::CreationRequest;

/// Calls the container creation flow needs from the Proxmox API.
///
/// Implementations make exactly one attempt per call; nothing here retries.
pub trait ProxmoxApi {
    /// Ask the cluster for the next free vmid (`GET /cluster/nextid`).
    ///
    /// The id is not reserved. Two runs racing each other can receive the
    /// same value.
    fn next_id(&self) -> Result<Vmid>;

    /// Submit a container creation (`POST /nodes/{node}/lxc`).
    ///
    /// Returns the task handle when the API started an asynchronous task.
    fn create_container(&self, node: &str, request: &CreationRequest) -> Result<Option<TaskHandle>>;

    /// Read a task's current status (`GET /nodes/{node}/tasks/{upid}/status`).
    fn task_status(&self, handle: &TaskHandle) -> Result<TaskState>;
}
