//! Test utilities for svcctl
//!
//! This crate provides mocks and fixtures for testing the lifecycle
//! controller without touching the real process table.
//!
//! # Mocks
//!
//! - [`MockProcessHost`] - Scripted process table and launcher. Spawned
//!   processes appear (or not) after a delay, signals make them exit (or
//!   not) after a delay. Every spawn and signal is recorded with its
//!   timestamp on the tokio clock, so paused-time tests can assert timing.
//!
//! # Fixtures
//!
//! - [`InstanceTree`] - Temporary `<root>/instances/...` layout builder
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use svcctl_testing::{InstanceTree, MockProcessHost, SpawnBehavior};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = InstanceTree::new();
//! tree.netprobe("a1", 7036).create();
//!
//! let host = MockProcessHost::new();
//! host.set_spawn_behavior(SpawnBehavior::AppearsAfter(Duration::from_millis(300)));
//!
//! let controller = tree.controller(host.clone());
//! controller.start("netprobe", "a1").await?;
//! assert_eq!(host.spawns().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
mod mocks;

pub use fixtures::{InstanceBuilder, InstanceTree};
pub use mocks::{MockProcessHost, SignalBehavior, SignalRecord, SpawnBehavior, SpawnRecord};
