//! Instance lifecycle controller for svcctl
//!
//! Service instances live under `<root>/instances/<kind>/<name>`. This crate
//! discovers them, validates their existence, enablement and rc
//! configuration, detects whether their process is running, and drives
//! start, stop and restart with bounded grace periods.
//!
//! # Architecture
//!
//! - [`Instance`]: point-in-time snapshot of one instance
//! - [`Inspector`]: builds snapshots (construction, rc load, commands, probe)
//! - [`Package`]: per-kind startup command and runtime pattern
//! - [`ProcessTable`] / [`ProcessLauncher`]: ports to the OS, implemented by
//!   [`SystemProcessTable`] and [`SystemLauncher`]
//! - [`LifecycleController`]: start/stop/restart, single or bulk
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use svcctl_core::{Inspector, LifecycleController, Packages, SystemLauncher, SystemProcessTable};
//!
//! let inspector = Inspector::new(root, Packages::builtin(), settings, Arc::new(SystemProcessTable::new()));
//! let controller = LifecycleController::new(inspector, Arc::new(SystemLauncher::new()));
//! controller.start("netprobe", "a1").await?;
//! ```

pub mod discovery;
pub mod error;
pub mod instance;
pub mod lifecycle;
pub mod packages;
pub mod pattern;
pub mod ports;
pub mod process;
pub mod rc;
pub mod snapshot;
pub mod usage;

pub use discovery::{discover_all, list_instance_kinds, list_instances};
pub use error::{
    DiscoveryError, EnablementError, ExistenceError, LaunchError, LifecycleError, PatternError,
    PreflightError, RcError, Result,
};
pub use instance::{
    GracePeriods, Instance, InstanceConfig, InstanceErrors, InstanceId, InstanceState,
};
pub use lifecycle::{
    Action, BulkEntry, BulkReport, LifecycleController, Outcome, RestartOutcome, StartOutcome,
    StopOutcome,
};
pub use packages::{LaunchContext, Package, PackageRef, Packages};
pub use pattern::{Fragment, RuntimePattern};
pub use ports::{
    ProcessLauncher, ProcessLauncherRef, ProcessStats, ProcessTable, ProcessTableRef, StopSignal,
};
pub use process::{probe, Liveness, SystemLauncher, SystemProcessTable};
pub use rc::{load_rc, RcValues};
pub use snapshot::Inspector;
pub use usage::{dir_size, ResourceUsage};
