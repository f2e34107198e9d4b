//! Bulk operations over every discovered instance

use svcctl_core::{
    Action, LifecycleError, Outcome, PreflightError, StartOutcome, StopOutcome,
};
use svcctl_testing::{InstanceTree, MockProcessHost};

fn provision(tree: &InstanceTree) {
    tree.netprobe("a1", 7036).create();
    // Invalid config: mandatory port missing
    tree.instance("netprobe", "b2").enabled().rc(&[]).create();
    tree.instance("node_exporter", "host")
        .enabled()
        .rc(&[("NODE_EXPORTER_LISTEN_PORT", "9100")])
        .create();
    // No descriptor for this kind
    tree.instance("postgres", "main").enabled().create();
}

#[tokio::test(start_paused = true)]
async fn test_bulk_start_continues_past_failures() {
    let tree = InstanceTree::new();
    provision(&tree);
    let host = MockProcessHost::new();
    let controller = tree.controller(host.clone());

    let report = controller.run_bulk(Action::Start).await.unwrap();

    let order: Vec<String> = report.entries.iter().map(|e| e.id.to_string()).collect();
    assert_eq!(
        order,
        vec![
            "type=netprobe name=a1",
            "type=netprobe name=b2",
            "type=node_exporter name=host",
            "type=postgres name=main",
        ]
    );

    assert!(matches!(
        report.entries[0].result,
        Ok(Outcome::Start(StartOutcome::Started { .. }))
    ));
    assert!(matches!(
        report.entries[1].result,
        Err(LifecycleError::Preflight(PreflightError::Config(_)))
    ));
    assert!(matches!(
        report.entries[2].result,
        Ok(Outcome::Start(StartOutcome::Started { .. }))
    ));
    assert!(matches!(
        report.entries[3].result,
        Err(LifecycleError::UnsupportedKind { .. })
    ));

    assert!(!report.is_success());
    assert_eq!(report.failures().count(), 2);
    assert_eq!(host.spawns().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_bulk_stop_skips_broken_config_without_failing() {
    let tree = InstanceTree::new();
    tree.netprobe("a1", 7036).create();
    tree.instance("netprobe", "b2").enabled().rc(&[]).create();
    tree.instance("node_exporter", "host")
        .enabled()
        .rc(&[("NODE_EXPORTER_LISTEN_PORT", "9100")])
        .create();
    let host = MockProcessHost::new();
    let controller = tree.controller(host.clone());
    controller.run_bulk(Action::Start).await.unwrap();

    let report = controller.run_bulk(Action::Stop).await.unwrap();

    assert!(matches!(
        report.entries[0].result,
        Ok(Outcome::Stop(StopOutcome::Stopped { .. }))
    ));
    assert!(matches!(
        report.entries[1].result,
        Ok(Outcome::Stop(StopOutcome::AlreadyStopped))
    ));
    assert!(matches!(
        report.entries[2].result,
        Ok(Outcome::Stop(StopOutcome::Stopped { .. }))
    ));
    assert!(report.is_success());
    assert_eq!(host.signals().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_bulk_operations_are_idempotent() {
    let tree = InstanceTree::new();
    tree.netprobe("a1", 7036).create();
    tree.netprobe("a2", 7037).create();
    let host = MockProcessHost::new();
    let controller = tree.controller(host.clone());

    assert!(controller.run_bulk(Action::Start).await.unwrap().is_success());
    assert!(controller.run_bulk(Action::Start).await.unwrap().is_success());
    assert_eq!(host.spawns().len(), 2);

    let stopped = controller.run_bulk(Action::Stop).await.unwrap();
    assert!(stopped.entries.iter().all(|e| matches!(
        e.result,
        Ok(Outcome::Stop(StopOutcome::Stopped { .. }))
    )));

    let again = controller.run_bulk(Action::Stop).await.unwrap();
    assert!(again.entries.iter().all(|e| matches!(
        e.result,
        Ok(Outcome::Stop(StopOutcome::AlreadyStopped))
    )));
    assert_eq!(host.signals().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_bulk_restart_targets_each_instance_once() {
    let tree = InstanceTree::new();
    tree.netprobe("a1", 7036).create();
    tree.netprobe("a2", 7037).create();
    let host = MockProcessHost::new();
    let controller = tree.controller(host.clone());
    controller.run_bulk(Action::Start).await.unwrap();

    let report = controller.run_bulk(Action::Restart).await.unwrap();

    assert!(report.is_success());
    assert_eq!(host.signals().len(), 2);
    assert_eq!(host.spawns().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_bulk_without_instances_root_is_fatal() {
    let tree = InstanceTree::bare();
    let host = MockProcessHost::new();
    let controller = tree.controller(host.clone());

    let err = controller.run_bulk(Action::Stop).await.unwrap_err();

    assert!(matches!(err, LifecycleError::Discovery(_)));
    assert!(err.is_fatal());
}
