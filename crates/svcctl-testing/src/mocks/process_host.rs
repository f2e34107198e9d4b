//! Scripted process host

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use svcctl_core::{
    LaunchError, ProcessLauncher, ProcessStats, ProcessTable, RuntimePattern, StopSignal,
};
use tokio::time::Instant;
use tracing::debug;

/// First pid handed out by the mock
const FIRST_PID: u32 = 40_000;

/// What happens after a spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnBehavior {
    /// A process with the spawned command line becomes visible after the delay
    AppearsAfter(Duration),
    /// A process with a different command line becomes visible after the
    /// delay (a launcher that execs into an interpreter)
    AppearsAs { cmdline: String, after: Duration },
    /// The spawn succeeds but no process ever shows up
    Never,
    /// The spawn itself fails
    Fails,
}

impl Default for SpawnBehavior {
    fn default() -> Self {
        SpawnBehavior::AppearsAfter(Duration::from_millis(200))
    }
}

/// What happens to a process after a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalBehavior {
    ExitsAfter(Duration),
    Ignored,
}

/// A recorded spawn
#[derive(Debug, Clone)]
pub struct SpawnRecord {
    pub pid: u32,
    pub args: Vec<String>,
    pub log_path: PathBuf,
    pub at: Instant,
}

/// A recorded signal
#[derive(Debug, Clone)]
pub struct SignalRecord {
    pub pid: u32,
    pub signal: StopSignal,
    pub at: Instant,
}

#[derive(Debug)]
struct MockProcess {
    pid: u32,
    cmdline: String,
    visible_from: Instant,
    exits_at: Option<Instant>,
    started_epoch: u64,
}

impl MockProcess {
    fn is_alive(&self, now: Instant) -> bool {
        self.visible_from <= now && self.exits_at.map_or(true, |exit| now < exit)
    }
}

#[derive(Debug)]
struct HostState {
    next_pid: u32,
    processes: Vec<MockProcess>,
    spawns: Vec<SpawnRecord>,
    signals: Vec<SignalRecord>,
    spawn_behavior: SpawnBehavior,
    on_term: SignalBehavior,
    on_kill: SignalBehavior,
}

/// In-memory process table and launcher
///
/// Defaults: spawned processes appear after 200ms, SIGTERM makes a process
/// exit after 100ms, SIGKILL after 10ms.
#[derive(Debug)]
pub struct MockProcessHost {
    state: Mutex<HostState>,
}

impl MockProcessHost {
    /// Create a host, shared between the controller and the test
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(HostState {
                next_pid: FIRST_PID,
                processes: Vec::new(),
                spawns: Vec::new(),
                signals: Vec::new(),
                spawn_behavior: SpawnBehavior::default(),
                on_term: SignalBehavior::ExitsAfter(Duration::from_millis(100)),
                on_kill: SignalBehavior::ExitsAfter(Duration::from_millis(10)),
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        // A panicking test thread must not hide the state from the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_spawn_behavior(&self, behavior: SpawnBehavior) {
        self.state().spawn_behavior = behavior;
    }

    pub fn set_on_term(&self, behavior: SignalBehavior) {
        self.state().on_term = behavior;
    }

    pub fn set_on_kill(&self, behavior: SignalBehavior) {
        self.state().on_kill = behavior;
    }

    /// Add a process that is already running. Returns its pid.
    pub fn add_running(&self, cmdline: impl Into<String>) -> u32 {
        let mut state = self.state();
        let pid = state.allocate_pid();
        state.processes.push(MockProcess {
            pid,
            cmdline: cmdline.into(),
            visible_from: Instant::now(),
            exits_at: None,
            started_epoch: 1_700_000_000,
        });
        pid
    }

    /// Whether a pid is currently alive
    pub fn is_alive(&self, pid: u32) -> bool {
        let now = Instant::now();
        self.state()
            .processes
            .iter()
            .any(|p| p.pid == pid && p.is_alive(now))
    }

    pub fn spawns(&self) -> Vec<SpawnRecord> {
        self.state().spawns.clone()
    }

    pub fn signals(&self) -> Vec<SignalRecord> {
        self.state().signals.clone()
    }
}

impl HostState {
    fn allocate_pid(&mut self) -> u32 {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }
}

impl ProcessTable for MockProcessHost {
    fn find_matching(&self, pattern: &RuntimePattern) -> Vec<u32> {
        let now = Instant::now();
        let mut pids: Vec<u32> = self
            .state()
            .processes
            .iter()
            .filter(|p| p.is_alive(now) && pattern.is_match(&p.cmdline))
            .map(|p| p.pid)
            .collect();
        pids.sort_unstable();
        pids
    }

    fn stats(&self, pid: u32) -> Option<ProcessStats> {
        let now = Instant::now();
        self.state()
            .processes
            .iter()
            .find(|p| p.pid == pid && p.is_alive(now))
            .map(|p| ProcessStats {
                start_time: p.started_epoch,
                threads: Some(4),
                memory_bytes: 64 * 1024 * 1024,
            })
    }
}

impl ProcessLauncher for MockProcessHost {
    fn spawn_detached(&self, args: &[String], log_path: &Path) -> Result<u32, LaunchError> {
        let program = args.first().ok_or(LaunchError::EmptyCommand)?;
        let mut state = self.state();
        let now = Instant::now();

        let (cmdline, delay) = match state.spawn_behavior.clone() {
            SpawnBehavior::Fails => {
                return Err(LaunchError::ExecutableMissing {
                    path: PathBuf::from(program),
                })
            }
            SpawnBehavior::AppearsAfter(after) => (Some(args.join(" ")), after),
            SpawnBehavior::AppearsAs { cmdline, after } => (Some(cmdline), after),
            SpawnBehavior::Never => (None, Duration::ZERO),
        };

        let pid = state.allocate_pid();
        debug!(pid, program = %program, log = %log_path.display(), "Mock spawn");
        if let Some(cmdline) = cmdline {
            state.processes.push(MockProcess {
                pid,
                cmdline,
                visible_from: now + delay,
                exits_at: None,
                started_epoch: 1_700_000_000,
            });
        }
        state.spawns.push(SpawnRecord {
            pid,
            args: args.to_vec(),
            log_path: log_path.to_path_buf(),
            at: now,
        });
        Ok(pid)
    }

    fn signal(&self, pid: u32, signal: StopSignal) -> Result<(), LaunchError> {
        debug!(pid, signal = %signal, "Mock signal");
        let mut state = self.state();
        let now = Instant::now();
        state.signals.push(SignalRecord {
            pid,
            signal,
            at: now,
        });

        let behavior = match signal {
            StopSignal::Terminate => state.on_term,
            StopSignal::Kill => state.on_kill,
        };
        if let SignalBehavior::ExitsAfter(after) = behavior {
            let exit = now + after;
            // Unknown pids are ignored, like ESRCH on a real host
            if let Some(process) = state.processes.iter_mut().find(|p| p.pid == pid) {
                process.exits_at = Some(process.exits_at.map_or(exit, |t| t.min(exit)));
            }
        }
        Ok(())
    }
}
