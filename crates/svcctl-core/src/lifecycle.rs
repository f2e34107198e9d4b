//! Lifecycle controller
//!
//! Drives start, stop and restart of instances against the live process
//! table. Every operation works on a fresh snapshot, issues at most one
//! spawn or one SIGTERM -> SIGKILL escalation, and confirms the outcome by
//! polling the process table within the kind's grace periods.
//!
//! Operations run sequentially. Nothing is retried beyond the single
//! escalation, and a failed operation never terminates the process: the
//! caller decides what is fatal (see [`LifecycleError::is_fatal`]).

use crate::discovery::discover_all;
use crate::error::{LifecycleError, Result};
use crate::instance::{Instance, InstanceId};
use crate::pattern::RuntimePattern;
use crate::ports::{ProcessLauncherRef, StopSignal};
use crate::process::probe;
use crate::snapshot::Inspector;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use svcctl_config::{paths, TimingConfig};
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

/// Lifecycle action, applicable to one instance or to all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Start,
    Stop,
    Restart,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Restart => "restart",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StartOutcome {
    /// A new process was spawned and confirmed
    Started { pid: u32 },
    /// Nothing to do
    AlreadyRunning { pid: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StopOutcome {
    /// The process disappeared after `signal`
    Stopped { pid: u32, signal: StopSignal },
    /// Nothing to do
    AlreadyStopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestartOutcome {
    pub stopped: StopOutcome,
    pub started: StartOutcome,
}

/// Outcome of a successful action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Start(StartOutcome),
    Stop(StopOutcome),
    Restart(RestartOutcome),
}

impl fmt::Display for StartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartOutcome::Started { pid } => write!(f, "started with pid={}", pid),
            StartOutcome::AlreadyRunning { pid } => write!(f, "already running with pid={}", pid),
        }
    }
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopOutcome::Stopped { pid, signal } => {
                write!(f, "terminated pid={} with {}", pid, signal)
            }
            StopOutcome::AlreadyStopped => f.write_str("already stopped"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Start(o) => o.fmt(f),
            Outcome::Stop(o) => o.fmt(f),
            Outcome::Restart(o) => write!(f, "{}, {}", o.stopped, o.started),
        }
    }
}

/// Per-instance result of a bulk action
#[derive(Debug)]
pub struct BulkEntry {
    pub id: InstanceId,
    pub result: Result<Outcome>,
}

/// Results of a bulk action, in discovery order
#[derive(Debug, Default)]
pub struct BulkReport {
    pub entries: Vec<BulkEntry>,
}

impl BulkReport {
    pub fn failures(&self) -> impl Iterator<Item = (&InstanceId, &LifecycleError)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().err().map(|e| (&entry.id, e)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Start/stop/restart orchestration for one root
#[derive(Clone)]
pub struct LifecycleController {
    inspector: Inspector,
    launcher: ProcessLauncherRef,
    timing: TimingConfig,
}

impl LifecycleController {
    pub fn new(inspector: Inspector, launcher: ProcessLauncherRef) -> Self {
        let timing = inspector.settings().timing.clone();
        Self {
            inspector,
            launcher,
            timing,
        }
    }

    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    /// Run one action against one instance
    pub async fn run(&self, action: Action, kind: &str, name: &str) -> Result<Outcome> {
        match action {
            Action::Start => self.start(kind, name).await.map(Outcome::Start),
            Action::Stop => self.stop(kind, name).await.map(Outcome::Stop),
            Action::Restart => self.restart(kind, name).await.map(Outcome::Restart),
        }
    }

    /// Run one action against every discovered instance
    ///
    /// A discovery failure is returned as an error. Per-instance failures
    /// are collected in the report and never abort the remaining instances.
    pub async fn run_bulk(&self, action: Action) -> Result<BulkReport> {
        let ids = discover_all(self.inspector.root())?;
        let mut report = BulkReport::default();

        for id in ids {
            let result = self.run(action, &id.kind, &id.name).await;
            if let Err(e) = &result {
                error!(instance = %id, action = %action, "{}", e);
            }
            report.entries.push(BulkEntry { id, result });
        }
        Ok(report)
    }

    /// Start an instance, if its preconditions hold and it is not running
    pub async fn start(&self, kind: &str, name: &str) -> Result<StartOutcome> {
        let instance = self.inspector.snapshot(kind, name)?;
        instance.log("attempting start");
        instance.preflight()?;
        self.start_instance(&instance).await
    }

    /// Stop an instance
    ///
    /// A failed precondition only blocks Stop when the instance does not
    /// exist; a disabled instance that is still running is stopped.
    pub async fn stop(&self, kind: &str, name: &str) -> Result<StopOutcome> {
        let instance = self.inspector.snapshot(kind, name)?;
        instance.log("attempting stop");
        if let Err(e) = instance.preflight() {
            if e.is_fatal() {
                return Err(e.into());
            }
        }
        self.stop_instance(&instance).await
    }

    /// Stop, re-derive, then start
    ///
    /// Stop is always attempted. Start only runs when the preconditions held
    /// before the stop, and when the stop itself succeeded; a failed stop is
    /// reported as `StartSkipped` wrapping the stop error.
    pub async fn restart(&self, kind: &str, name: &str) -> Result<RestartOutcome> {
        let instance = self.inspector.snapshot(kind, name)?;
        instance.log("attempting restart");
        let preflight = instance.preflight();
        if let Err(e) = &preflight {
            if e.is_fatal() {
                return Err(e.clone().into());
            }
        }

        let stopped = self.stop_instance(&instance).await;

        // The stop changed the process table; never reuse the old snapshot
        let fresh = self.inspector.snapshot(kind, name)?;
        preflight?;
        let stopped = match stopped {
            Ok(stopped) => stopped,
            Err(cause) => {
                warn!(instance = %instance.id, "start skipped: stop failed");
                return Err(LifecycleError::StartSkipped {
                    instance: instance.id.clone(),
                    cause: Box::new(cause),
                });
            }
        };

        let started = self.start_instance(&fresh).await?;
        Ok(RestartOutcome { stopped, started })
    }

    async fn start_instance(&self, instance: &Instance) -> Result<StartOutcome> {
        if let Some(pid) = instance.state.pid {
            instance.log("already running");
            return Ok(StartOutcome::AlreadyRunning { pid });
        }
        let pattern = runtime_pattern(instance)?;

        instance.log("starting");
        let log_path = paths::log_file(&instance.workdir, &instance.id.kind);
        let spawned_pid = self
            .launcher
            .spawn_detached(&instance.config.startup_args, &log_path)?;

        sleep(self.timing.settle_delay()).await;

        let grace = instance.config.grace.startup;
        let waiting_since = Instant::now();
        loop {
            if let Some(pid) = probe(self.inspector.table().as_ref(), pattern).pid() {
                info!(instance = %instance.id, pid, "started");
                return Ok(StartOutcome::Started { pid });
            }
            if waiting_since.elapsed() >= grace {
                warn!(
                    instance = %instance.id,
                    spawned_pid,
                    grace = ?grace,
                    "did not start within grace period"
                );
                return Err(LifecycleError::StartTimeout {
                    instance: instance.id.clone(),
                    grace,
                    spawned_pid,
                });
            }
            sleep(self.timing.poll_interval()).await;
        }
    }

    async fn stop_instance(&self, instance: &Instance) -> Result<StopOutcome> {
        let Some(pid) = instance.state.pid else {
            if let Some(e) = &instance.errors.config {
                warn!(instance = %instance.id, "no runtime pattern: {}", e);
            }
            instance.log("already stopped");
            return Ok(StopOutcome::AlreadyStopped);
        };
        let pattern = runtime_pattern(instance)?;

        instance.log("stopping");
        let grace = instance.config.grace;
        for (signal, window) in [
            (StopSignal::Terminate, grace.sigterm),
            (StopSignal::Kill, grace.sigkill),
        ] {
            self.launcher.signal(pid, signal)?;
            if self.wait_until_gone(pattern, pid, window).await {
                info!(instance = %instance.id, pid, signal = %signal, "terminated");
                return Ok(StopOutcome::Stopped { pid, signal });
            }
            warn!(
                instance = %instance.id,
                pid,
                signal = %signal,
                window = ?window,
                "still running after grace period"
            );
        }

        warn!(instance = %instance.id, pid, "failed to terminate within grace period");
        Err(LifecycleError::StopTimeout {
            instance: instance.id.clone(),
            pid,
        })
    }

    /// Poll until `pid` no longer matches the pattern, up to `window`
    async fn wait_until_gone(&self, pattern: &RuntimePattern, pid: u32, window: Duration) -> bool {
        let since = Instant::now();
        while since.elapsed() < window {
            sleep(self.timing.poll_interval()).await;
            if !probe(self.inspector.table().as_ref(), pattern)
                .matches()
                .contains(&pid)
            {
                return true;
            }
        }
        false
    }
}

fn runtime_pattern(instance: &Instance) -> Result<&RuntimePattern> {
    instance
        .config
        .runtime_pattern
        .as_ref()
        .ok_or_else(|| LifecycleError::NoRuntimePattern {
            instance: instance.id.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            Outcome::Start(StartOutcome::Started { pid: 7 }).to_string(),
            "started with pid=7"
        );
        assert_eq!(
            Outcome::Restart(RestartOutcome {
                stopped: StopOutcome::Stopped {
                    pid: 7,
                    signal: StopSignal::Kill
                },
                started: StartOutcome::Started { pid: 8 },
            })
            .to_string(),
            "terminated pid=7 with SIGKILL, started with pid=8"
        );
    }

    #[test]
    fn test_bulk_report_success() {
        let mut report = BulkReport::default();
        report.entries.push(BulkEntry {
            id: InstanceId::new("netprobe", "a1"),
            result: Ok(Outcome::Stop(StopOutcome::AlreadyStopped)),
        });
        assert!(report.is_success());

        report.entries.push(BulkEntry {
            id: InstanceId::new("netprobe", "b2"),
            result: Err(LifecycleError::StopTimeout {
                instance: InstanceId::new("netprobe", "b2"),
                pid: 9,
            }),
        });
        assert!(!report.is_success());
        let failed: Vec<_> = report.failures().map(|(id, _)| id.name.as_str()).collect();
        assert_eq!(failed, vec!["b2"]);
    }
}
