// End-to-end runs of the check/start cycle against the in-memory provider.

use revive::{run, Outcome, RestartError};
use revive_common::ComputeError;
use revive_providers::mock::MockConnector;
use revive_providers::Connector;
use std::cell::Cell;

const ARGS: [&str; 4] = ["revive", "vm-1", "proj-a", "us-central1-a"];

/// Hands a clone of the mock to `run`; clones share the call counters.
fn connect_with(
    connector: &MockConnector,
) -> impl FnOnce() -> Result<Box<dyn Connector>, RestartError> {
    let connector = connector.clone();
    move || Ok(Box::new(connector) as Box<dyn Connector>)
}

#[tokio::test]
async fn test_stopped_instance_is_started_once() {
    let connector = MockConnector::stopped();

    let outcome = run(ARGS, connect_with(&connector)).await.unwrap();

    assert_eq!(outcome, Outcome::Restarted);
    let calls = connector.calls();
    assert_eq!(calls.get_instance(), 1);
    assert_eq!(calls.start_instance(), 1);
    assert!(calls.wait_operation() >= 1);
    // One client for the status check, one for the start.
    assert_eq!(calls.connects(), 2);
}

#[tokio::test]
async fn test_running_instance_is_left_alone() {
    let connector = MockConnector::running();

    let outcome = run(ARGS, connect_with(&connector)).await.unwrap();

    assert_eq!(outcome, Outcome::NotStopped);
    assert_eq!(connector.calls().get_instance(), 1);
    assert_eq!(connector.calls().start_instance(), 0);
    assert_eq!(connector.calls().connects(), 1);
}

#[tokio::test]
async fn test_non_terminated_statuses_never_start() {
    for status in [
        "PROVISIONING",
        "STAGING",
        "RUNNING",
        "STOPPING",
        "STOPPED",
        "SUSPENDING",
        "SUSPENDED",
        "REPAIRING",
        "Terminated",
        "SOMETHING_NEW",
    ] {
        let connector = MockConnector::with_status(status);
        let outcome = run(ARGS, connect_with(&connector)).await.unwrap();
        assert_eq!(outcome, Outcome::NotStopped, "status {}", status);
        assert_eq!(connector.calls().start_instance(), 0, "status {}", status);
    }
}

#[tokio::test]
async fn test_status_failure_aborts_without_start() {
    let connector = MockConnector::stopped().failing_get(ComputeError::request(
        Some(403),
        "status=403 PERMISSION_DENIED: Required 'compute.instances.get' permission",
    ));

    let err = run(ARGS, connect_with(&connector)).await.unwrap_err();

    assert!(matches!(err, RestartError::GetInstance(_)));
    assert_ne!(err.exit_code(), 0);
    assert_eq!(connector.calls().start_instance(), 0);
}

#[tokio::test]
async fn test_failed_start_operation_aborts() {
    let connector = MockConnector::stopped()
        .failing_operation("RESOURCE_CONFLICT", "instance is being modified");

    let err = run(ARGS, connect_with(&connector)).await.unwrap_err();

    assert!(matches!(err, RestartError::WaitOperation(_)));
    assert_ne!(err.exit_code(), 0);
    assert_eq!(connector.calls().start_instance(), 1);
}

#[tokio::test]
async fn test_rejected_start_aborts() {
    let connector = MockConnector::stopped()
        .failing_start(ComputeError::request(Some(409), "status=409 ALREADY_EXISTS"));

    let err = run(ARGS, connect_with(&connector)).await.unwrap_err();

    assert!(matches!(err, RestartError::StartInstance(_)));
    assert_eq!(connector.calls().wait_operation(), 0);
}

#[tokio::test]
async fn test_wrong_argument_count_makes_no_remote_calls() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["revive"],
        vec!["revive", "vm-1"],
        vec!["revive", "vm-1", "proj-a"],
        vec!["revive", "vm-1", "proj-a", "us-central1-a", "extra"],
        vec!["revive", "vm-1", "proj-a", "us-central1-a", "extra", "more"],
    ];
    for args in cases {
        let connector = MockConnector::stopped();
        let err = run(args.clone(), connect_with(&connector)).await.unwrap_err();
        assert!(matches!(err, RestartError::Usage(_)), "args {:?}", args);
        assert_ne!(err.exit_code(), 0);
        assert_eq!(connector.calls().connects(), 0, "args {:?}", args);
        assert_eq!(connector.calls().remote_calls(), 0, "args {:?}", args);
    }
}

#[tokio::test]
async fn test_connection_failure_aborts() {
    let connector = MockConnector::stopped().failing_connect("no access token configured");

    let err = run(ARGS, connect_with(&connector)).await.unwrap_err();

    assert!(matches!(
        err,
        RestartError::GetInstance(ComputeError::Connection(_))
    ));
    assert_eq!(connector.calls().remote_calls(), 0);
}

#[tokio::test]
async fn test_usage_error_wins_over_configuration_error() {
    let built = Cell::new(false);
    let broken_config = || -> Result<Box<dyn Connector>, RestartError> {
        built.set(true);
        Err(RestartError::Config(anyhow::anyhow!(
            "invalid configuration: GCE_POLL_INTERVAL_MS must be a non-negative integer"
        )))
    };

    let err = run(["revive", "vm-1"], broken_config).await.unwrap_err();

    assert!(matches!(err, RestartError::Usage(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!built.get());
}

#[tokio::test]
async fn test_help_works_with_broken_configuration() {
    let broken_config = || -> Result<Box<dyn Connector>, RestartError> {
        Err(RestartError::Config(anyhow::anyhow!("unknown provider \"mock\"")))
    };

    let err = run(["revive", "--help"], broken_config).await.unwrap_err();

    assert!(matches!(err, RestartError::Usage(_)));
    assert_eq!(err.exit_code(), 0);
}

#[tokio::test]
async fn test_configuration_error_after_valid_arguments() {
    let broken_config = || -> Result<Box<dyn Connector>, RestartError> {
        Err(RestartError::Config(anyhow::anyhow!("unknown provider \"mock\"")))
    };

    let err = run(ARGS, broken_config).await.unwrap_err();

    assert!(matches!(err, RestartError::Config(_)));
    assert_eq!(err.kind(), "config");
    assert_eq!(err.exit_code(), 1);
}
