//! Mock implementations of the process ports
//!
//! - [`MockProcessHost`] - implements both `ProcessTable` and
//!   `ProcessLauncher` over one in-memory process list

mod process_host;

pub use process_host::{MockProcessHost, SignalBehavior, SignalRecord, SpawnBehavior, SpawnRecord};
