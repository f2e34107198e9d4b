//! Port traits for the OS process layer
//!
//! The controller only talks to the process table and to the launcher
//! through these traits. [`crate::process`] implements them against the
//! live system; `svcctl-testing` provides scripted mocks.

use crate::error::LaunchError;
use crate::pattern::RuntimePattern;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Signals used to stop an instance, in escalation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StopSignal {
    /// Graceful termination (SIGTERM)
    Terminate,
    /// Forceful kill (SIGKILL)
    Kill,
}

impl StopSignal {
    pub fn name(&self) -> &'static str {
        match self {
            StopSignal::Terminate => "SIGTERM",
            StopSignal::Kill => "SIGKILL",
        }
    }
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resource figures of a live process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    /// Start time, seconds since the Unix epoch
    pub start_time: u64,
    /// Number of threads, when the platform reports them
    pub threads: Option<usize>,
    /// Resident memory in bytes
    pub memory_bytes: u64,
}

/// Read-only view of the live process table
pub trait ProcessTable: Send + Sync {
    /// Pids of every process whose command line matches the pattern, sorted.
    ///
    /// No match is a normal "not running" result, not an error.
    fn find_matching(&self, pattern: &RuntimePattern) -> Vec<u32>;

    /// Resource figures for a pid, if it is alive
    fn stats(&self, _pid: u32) -> Option<ProcessStats> {
        None
    }
}

/// Spawns detached processes and delivers signals
pub trait ProcessLauncher: Send + Sync {
    /// Spawn `args` detached from the caller, appending stdout and stderr to
    /// `log_path`. Returns the pid of the spawned process.
    fn spawn_detached(&self, args: &[String], log_path: &Path) -> Result<u32, LaunchError>;

    /// Fire-and-forget signal delivery. A pid that no longer exists is not an
    /// error.
    fn signal(&self, pid: u32, signal: StopSignal) -> Result<(), LaunchError>;
}

/// Thread-safe reference to a process table
pub type ProcessTableRef = Arc<dyn ProcessTable>;

/// Thread-safe reference to a process launcher
pub type ProcessLauncherRef = Arc<dyn ProcessLauncher>;
