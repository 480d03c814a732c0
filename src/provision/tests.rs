//! End-to-end tests for the provisioning flow against a scripted API.

use super::*;
use crate::api::TaskState;
use crate::test_support::{FakeApi, SleepRecorder, TEST_UPID, credentials_with, stopped};

const MINIMAL: &str = r#"
node: pve
template: local:vztmpl/x.tar.zst
resources:
  memory: 1024
"#;

fn minimal_spec() -> ContainerSpec {
    ContainerSpec::from_yaml(MINIMAL).unwrap()
}

#[test]
fn test_successful_run() {
    let api = FakeApi::new(vec![TaskState::Running, TaskState::Running, stopped("OK")]);
    let mut sleeps = SleepRecorder::default();

    let report = provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &ProvisionOptions::default(),
        &mut sleeps.sleeper(),
    )
    .unwrap();

    assert_eq!(report.vmid.get(), 104);
    assert_eq!(report.node, "pve");
    assert_eq!(report.upid.as_deref(), Some(TEST_UPID));
    assert_eq!(report.outcome, Some(Outcome::Success));
    assert_eq!(api.next_id_calls.get(), 1);
    assert_eq!(api.create_calls.get(), 1);
    assert_eq!(api.status_calls.get(), 3);
    assert_eq!(sleeps.slept.len(), 2);
    assert!(report.into_result().is_ok());
}

#[test]
fn test_submitted_request_targets_node_with_allocated_vmid() {
    let api = FakeApi::new(vec![stopped("OK")]);
    let mut sleeps = SleepRecorder::default();

    provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &ProvisionOptions::default(),
        &mut sleeps.sleeper(),
    )
    .unwrap();

    let submitted = api.submitted.borrow();
    let (node, request) = submitted.as_ref().unwrap();
    assert_eq!(node, "pve");
    assert_eq!(request.get("vmid"), Some("104"));
    assert_eq!(request.get("ostemplate"), Some("local:vztmpl/x.tar.zst"));
    assert_eq!(request.get("net0"), Some("name=eth0,bridge=vmbr0,ip=dhcp"));
}

#[test]
fn test_missing_memory_fails_before_any_network_call() {
    let spec = ContainerSpec {
        node: Some("pve".to_string()),
        template: Some("local:vztmpl/x.tar.zst".to_string()),
        ..Default::default()
    };
    let api = FakeApi::new(vec![stopped("OK")]);
    let mut sleeps = SleepRecorder::default();

    let err = provision(
        &spec,
        &credentials_with(&[]),
        &api,
        &ProvisionOptions::default(),
        &mut sleeps.sleeper(),
    )
    .unwrap_err();

    assert!(matches!(err, ProvisionError::ValidationError(_)));
    assert!(err.to_string().contains("resources.memory"));
    assert_eq!(api.network_calls(), 0);
}

#[test]
fn test_explicit_vmid_skips_allocation() {
    let api = FakeApi::new(vec![stopped("OK")]);
    let mut sleeps = SleepRecorder::default();
    let options = ProvisionOptions {
        vmid: Some(Vmid::new(250).unwrap()),
        ..Default::default()
    };

    let report = provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &options,
        &mut sleeps.sleeper(),
    )
    .unwrap();

    assert_eq!(report.vmid.get(), 250);
    assert_eq!(api.next_id_calls.get(), 0);
    assert_eq!(report.request.get("vmid"), Some("250"));
}

#[test]
fn test_dry_run_creates_nothing() {
    let api = FakeApi::new(vec![]);
    let mut sleeps = SleepRecorder::default();
    let options = ProvisionOptions {
        dry_run: true,
        ..Default::default()
    };

    let report = provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &options,
        &mut sleeps.sleeper(),
    )
    .unwrap();

    assert_eq!(report.outcome, None);
    assert_eq!(api.create_calls.get(), 0);
    assert_eq!(api.status_calls.get(), 0);

    let summary = serde_json::to_value(report.summary()).unwrap();
    assert_eq!(summary["dry_run"], true);
    assert!(
        summary["parameters"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("rootfs=local-lvm:8"))
    );
    assert!(report.into_result().is_ok());
}

#[test]
fn test_remote_failure_is_reported_then_mapped() {
    let api = FakeApi::new(vec![TaskState::Running, stopped("ERROR")]);
    let mut sleeps = SleepRecorder::default();

    let report = provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &ProvisionOptions::default(),
        &mut sleeps.sleeper(),
    )
    .unwrap();

    assert_eq!(report.outcome, Some(Outcome::Failure("ERROR".to_string())));
    let err = report.into_result().unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::RemoteTaskFailure { ref exit_status, .. } if exit_status == "ERROR"
    ));
}

#[test]
fn test_missing_task_id_is_unknown_outcome() {
    let api = FakeApi::new(vec![]).without_task();
    let mut sleeps = SleepRecorder::default();

    let report = provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &ProvisionOptions::default(),
        &mut sleeps.sleeper(),
    )
    .unwrap();

    assert_eq!(report.outcome, Some(Outcome::Unknown));
    assert_eq!(api.status_calls.get(), 0);
    let err = report.into_result().unwrap_err();
    assert!(matches!(err, ProvisionError::OutcomeUnknown { vmid: 104, .. }));
}

#[test]
fn test_create_failure_aborts_without_polling() {
    let api = FakeApi::new(vec![stopped("OK")]).failing_create(ProvisionError::TransportError(
        "connection refused".to_string(),
    ));
    let mut sleeps = SleepRecorder::default();

    let err = provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &ProvisionOptions::default(),
        &mut sleeps.sleeper(),
    )
    .unwrap_err();

    assert!(matches!(err, ProvisionError::TransportError(_)));
    assert_eq!(api.create_calls.get(), 1);
    assert_eq!(api.status_calls.get(), 0);
}

#[test]
fn test_timeout_surfaces_as_error() {
    let api = FakeApi::new(vec![]);
    let mut sleeps = SleepRecorder::default();
    let options = ProvisionOptions {
        poll: PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 3,
        },
        ..Default::default()
    };

    let err = provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &options,
        &mut sleeps.sleeper(),
    )
    .unwrap_err();

    assert!(matches!(err, ProvisionError::TimeoutError { attempts: 3, .. }));
    assert_eq!(sleeps.slept, vec![Duration::from_millis(10); 2]);
}

#[test]
fn test_summary_json_for_completed_run() {
    let api = FakeApi::new(vec![stopped("OK")]);
    let mut sleeps = SleepRecorder::default();

    let report = provision(
        &minimal_spec(),
        &credentials_with(&[]),
        &api,
        &ProvisionOptions::default(),
        &mut sleeps.sleeper(),
    )
    .unwrap();
    let summary = serde_json::to_value(report.summary()).unwrap();

    assert_eq!(summary["vmid"], 104);
    assert_eq!(summary["node"], "pve");
    assert_eq!(summary["dry_run"], false);
    assert_eq!(summary["upid"], TEST_UPID);
    assert_eq!(summary["outcome"]["result"], "success");
    assert!(summary.get("parameters").is_none());
}
