//! Process matching and the system implementations of the process ports
//!
//! Liveness follows an exactly-one-match convention: an instance is up iff
//! exactly one process matches its runtime pattern. Zero matches and more
//! than one match are both reported as not up; [`Liveness::matches`] keeps
//! the raw result for callers that want to tell them apart.

use crate::error::LaunchError;
use crate::pattern::RuntimePattern;
use crate::ports::{ProcessLauncher, ProcessStats, ProcessTable, StopSignal};
use std::fs::OpenOptions;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::{debug, trace};

/// Result of probing the process table for one pattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Liveness {
    matches: Vec<u32>,
}

impl Liveness {
    pub fn from_matches(matches: Vec<u32>) -> Self {
        Self { matches }
    }

    /// Pid of the single matching process; `None` for zero or ambiguous matches
    pub fn pid(&self) -> Option<u32> {
        match self.matches.as_slice() {
            [pid] => Some(*pid),
            _ => None,
        }
    }

    pub fn is_up(&self) -> bool {
        self.pid().is_some()
    }

    /// Every matching pid
    pub fn matches(&self) -> &[u32] {
        &self.matches
    }
}

/// Probe the process table for a runtime pattern
pub fn probe(table: &dyn ProcessTable, pattern: &RuntimePattern) -> Liveness {
    Liveness::from_matches(table.find_matching(pattern))
}

// ============================================================================
// System process table
// ============================================================================

/// Process table backed by `sysinfo`
///
/// Every call scans a fresh snapshot; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct SystemProcessTable {
    own_pid: u32,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            own_pid: std::process::id(),
        }
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    fn find_matching(&self, pattern: &RuntimePattern) -> Vec<u32> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always),
        );

        let mut pids: Vec<u32> = system
            .processes()
            .iter()
            .filter(|(pid, process)| {
                pid.as_u32() != self.own_pid && process.thread_kind().is_none()
            })
            .filter_map(|(pid, process)| {
                let cmd = process.cmd();
                if cmd.is_empty() {
                    // Kernel threads and zombies
                    return None;
                }
                let cmdline = cmd
                    .iter()
                    .map(|arg| arg.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ");
                pattern.is_match(&cmdline).then(|| pid.as_u32())
            })
            .collect();

        pids.sort_unstable();
        trace!(pattern = %pattern, matches = ?pids, "Scanned process table");
        pids
    }

    fn stats(&self, pid: u32) -> Option<ProcessStats> {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        system.process(pid).map(|process| ProcessStats {
            start_time: process.start_time(),
            threads: process.tasks().map(|tasks| tasks.len()),
            memory_bytes: process.memory(),
        })
    }
}

// ============================================================================
// System launcher
// ============================================================================

/// Launcher spawning through `nohup` in a separate process group and
/// signalling through `nix`
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for SystemLauncher {
    fn spawn_detached(&self, args: &[String], log_path: &Path) -> Result<u32, LaunchError> {
        let (program, rest) = args.split_first().ok_or(LaunchError::EmptyCommand)?;

        let metadata = std::fs::metadata(program).map_err(|_| LaunchError::ExecutableMissing {
            path: PathBuf::from(program),
        })?;
        if metadata.is_dir() {
            return Err(LaunchError::ExecutableIsDir {
                path: PathBuf::from(program),
            });
        }

        // Append to the instance log (stdout and stderr share it)
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(|source| LaunchError::LogFile {
                path: log_path.to_path_buf(),
                source,
            })?;
        let log_file_stderr = log_file
            .try_clone()
            .map_err(|source| LaunchError::LogFile {
                path: log_path.to_path_buf(),
                source,
            })?;

        let child = Command::new("nohup")
            .arg(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(log_file_stderr))
            .process_group(0)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.clone(),
                source,
            })?;

        let pid = child.id();
        debug!(pid, program = %program, log = %log_path.display(), "Spawned detached process");
        Ok(pid)
    }

    fn signal(&self, pid: u32, signal: StopSignal) -> Result<(), LaunchError> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid as NixPid;

        let raw = i32::try_from(pid).map_err(|_| LaunchError::Signal {
            pid,
            signal: signal.name(),
            reason: "pid out of range".to_string(),
        })?;
        let nix_signal = match signal {
            StopSignal::Terminate => Signal::SIGTERM,
            StopSignal::Kill => Signal::SIGKILL,
        };

        match kill(NixPid::from_raw(raw), nix_signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!(pid, signal = %signal, "Process already gone");
                Ok(())
            }
            Err(e) => Err(LaunchError::Signal {
                pid,
                signal: signal.name(),
                reason: e.to_string(),
            }),
        }
    }
}
