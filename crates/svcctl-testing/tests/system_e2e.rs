//! End-to-end lifecycle against the real process table
//!
//! Installs a shell script as the netprobe package binary, then starts and
//! stops it through `SystemLauncher` and `SystemProcessTable`.

#![cfg(target_os = "linux")]

use std::sync::Arc;
use svcctl_config::Settings;
use svcctl_core::{
    Inspector, LifecycleController, Packages, StartOutcome, StopOutcome, StopSignal,
    SystemLauncher, SystemProcessTable,
};
use svcctl_testing::InstanceTree;

const FAKE_PROBE: &str = "#!/bin/sh\nwhile true; do sleep 0.05; done\n";

fn system_controller(tree: &InstanceTree) -> LifecycleController {
    let inspector = Inspector::new(
        tree.root(),
        Packages::builtin(),
        Settings::default(),
        Arc::new(SystemProcessTable::new()),
    );
    LifecycleController::new(inspector, Arc::new(SystemLauncher::new()))
}

#[tokio::test]
async fn test_start_then_stop_real_process() {
    svcctl_logging::init_test();
    let tree = InstanceTree::new();
    tree.install_package("netprobe", "active_prod", "netprobe.linux_64", FAKE_PROBE);
    // Unique per test process so parallel runs never see each other
    let port = (std::process::id() % 50_000 + 10_000) as u16;
    let workdir = tree.netprobe("e2e", port).create();
    let controller = system_controller(&tree);

    let started = controller.start("netprobe", "e2e").await.unwrap();
    let StartOutcome::Started { pid } = started else {
        panic!("expected a fresh start, got {:?}", started);
    };
    assert!(workdir.join("netprobe.log").is_file());

    let again = controller.start("netprobe", "e2e").await.unwrap();
    assert_eq!(again, StartOutcome::AlreadyRunning { pid });

    let stopped = controller.stop("netprobe", "e2e").await.unwrap();
    assert_eq!(
        stopped,
        StopOutcome::Stopped {
            pid,
            signal: StopSignal::Terminate
        }
    );

    let snapshot = controller.inspector().snapshot("netprobe", "e2e").unwrap();
    assert!(!snapshot.state.up);
}

#[tokio::test]
async fn test_missing_package_binary_fails_start() {
    let tree = InstanceTree::new();
    tree.netprobe("nobin", 7036).create();
    let controller = system_controller(&tree);

    let err = controller.start("netprobe", "nobin").await.unwrap_err();

    assert!(err.to_string().contains("not found"));
    assert!(!tree.workdir("netprobe", "nobin").join("netprobe.log").exists());
}
