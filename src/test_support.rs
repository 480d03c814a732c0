use crate::api::{ProxmoxApi, TaskHandle, TaskState, Vmid};
use crate::credentials::{
    CredentialContext, HOST_VAR, TOKEN_NAME_VAR, TOKEN_SECRET_VAR, USER_VAR,
};
use crate::error::{ProvisionError, Result};
use crate::request::CreationRequest;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

pub(crate) const TEST_UPID: &str = "UPID:pve:0019F3A2:0A1B2C3D:65A0B1C2:vzcreate:104:root@pam!ci:";

/// Credentials with the mandatory fields filled in plus `extra` secrets.
pub(crate) fn credentials_with(extra: &[(&str, &str)]) -> CredentialContext {
    let mut vars: BTreeMap<String, String> = [
        (HOST_VAR, "pve.test"),
        (USER_VAR, "root@pam"),
        (TOKEN_NAME_VAR, "ci"),
        (TOKEN_SECRET_VAR, "00000000-0000-0000-0000-000000000000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    CredentialContext::from_vars(vars).unwrap()
}

/// Scripted stand-in for the Proxmox API that counts every call.
pub(crate) struct FakeApi {
    next_id: u32,
    create_returns_task: bool,
    create_error: RefCell<Option<ProvisionError>>,
    statuses: RefCell<VecDeque<TaskState>>,
    pub(crate) next_id_calls: Cell<usize>,
    pub(crate) create_calls: Cell<usize>,
    pub(crate) status_calls: Cell<usize>,
    pub(crate) submitted: RefCell<Option<(String, CreationRequest)>>,
}

impl FakeApi {
    pub(crate) fn new(statuses: Vec<TaskState>) -> Self {
        Self {
            next_id: 104,
            create_returns_task: true,
            create_error: RefCell::new(None),
            statuses: RefCell::new(statuses.into()),
            next_id_calls: Cell::new(0),
            create_calls: Cell::new(0),
            status_calls: Cell::new(0),
            submitted: RefCell::new(None),
        }
    }

    /// The creation call answers without a task id.
    pub(crate) fn without_task(mut self) -> Self {
        self.create_returns_task = false;
        self
    }

    /// The creation call fails with `err`.
    pub(crate) fn failing_create(self, err: ProvisionError) -> Self {
        *self.create_error.borrow_mut() = Some(err);
        self
    }

    pub(crate) fn network_calls(&self) -> usize {
        self.next_id_calls.get() + self.create_calls.get() + self.status_calls.get()
    }
}

impl ProxmoxApi for FakeApi {
    fn next_id(&self) -> Result<Vmid> {
        self.next_id_calls.set(self.next_id_calls.get() + 1);
        Vmid::new(self.next_id)
    }

    fn create_container(&self, node: &str, request: &CreationRequest) -> Result<Option<TaskHandle>> {
        self.create_calls.set(self.create_calls.get() + 1);
        if let Some(err) = self.create_error.borrow_mut().take() {
            return Err(err);
        }
        *self.submitted.borrow_mut() = Some((node.to_string(), request.clone()));
        Ok(self.create_returns_task.then(|| TaskHandle {
            node: node.to_string(),
            upid: TEST_UPID.to_string(),
        }))
    }

    fn task_status(&self, _handle: &TaskHandle) -> Result<TaskState> {
        self.status_calls.set(self.status_calls.get() + 1);
        Ok(self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(TaskState::Running))
    }
}

/// Sleep replacement that records requested intervals instead of blocking.
#[derive(Default)]
pub(crate) struct SleepRecorder {
    pub(crate) slept: Vec<Duration>,
}

impl SleepRecorder {
    pub(crate) fn sleeper(&mut self) -> impl FnMut(Duration) + '_ {
        |d| self.slept.push(d)
    }
}

pub(crate) fn test_handle() -> TaskHandle {
    TaskHandle {
        node: "pve".to_string(),
        upid: TEST_UPID.to_string(),
    }
}

pub(crate) fn stopped(exit_status: &str) -> TaskState {
    TaskState::Stopped {
        exit_status: Some(exit_status.to_string()),
    }
}
