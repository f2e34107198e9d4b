//! Error types for the instance lifecycle controller
//!
//! Errors fall in three classes:
//! - provisioning errors (missing instances root, missing instance): fatal
//!   for the invoking command, see [`LifecycleError::is_fatal`]
//! - instance-scoped errors (existence, enablement, configuration): recorded
//!   on the [`Instance`](crate::Instance) snapshot and surfaced to callers
//! - operation failures (spawn, signal, grace period exhaustion): reported,
//!   never retried beyond the SIGTERM -> SIGKILL escalation

use crate::instance::InstanceId;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Why an instance workdir is not usable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExistenceError {
    #[error("No such directory {path} for instances of type '{kind}'.")]
    KindDirMissing { kind: String, path: PathBuf },

    #[error("{path} exists but is not a directory.")]
    KindDirNotDir { path: PathBuf },

    #[error("Instance directory {path} for '{name}' not found.")]
    InstanceDirMissing { name: String, path: PathBuf },

    #[error("{path} exists but is not a directory.")]
    InstanceDirNotDir { path: PathBuf },
}

/// Why an existing instance is not enabled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnablementError {
    #[error("enabled.flag not found at {workdir}. Please enable instance.")]
    FlagMissing { workdir: PathBuf },

    #[error("enabled.flag exists at {workdir} but is a directory !")]
    FlagIsDir { workdir: PathBuf },
}

/// Instance rc file could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RcError {
    #[error("Unable to load instance config at {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("{var} definition missing in {path}")]
    MissingVar { var: String, path: PathBuf },
}

/// Runtime pattern could not be compiled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Runtime pattern is empty")]
    Empty,

    #[error("Invalid runtime pattern '{pattern}': {reason}")]
    Invalid { pattern: String, reason: String },
}

/// Spawning or signalling an OS process failed
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Startup command is empty")]
    EmptyCommand,

    #[error("Package binary {path} not found")]
    ExecutableMissing { path: PathBuf },

    #[error("{path} is not a file.")]
    ExecutableIsDir { path: PathBuf },

    #[error("Failed creating log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed starting {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Failed to send {signal} to pid={pid}: {reason}")]
    Signal {
        pid: u32,
        signal: &'static str,
        reason: String,
    },
}

/// The instances base (or a kind directory) could not be enumerated
#[derive(Debug, Error)]
#[error("Unable to read instances directory {path}: {source}")]
pub struct DiscoveryError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Precondition gate failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreflightError {
    #[error("Does not exist. {0}")]
    Missing(ExistenceError),

    #[error("{0}")]
    Config(RcError),

    #[error("Instance is not enabled")]
    Disabled,
}

impl PreflightError {
    /// Missing instances terminate the invoking operation
    pub fn is_fatal(&self) -> bool {
        matches!(self, PreflightError::Missing(_))
    }
}

/// Lifecycle operation failure
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Unsupported instance type '{kind}'")]
    UnsupportedKind { kind: String },

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("{instance}: no runtime pattern (configuration did not resolve)")]
    NoRuntimePattern { instance: InstanceId },

    #[error("{instance}: did not start within grace period ({grace:?}), spawned pid={spawned_pid}")]
    StartTimeout {
        instance: InstanceId,
        grace: Duration,
        spawned_pid: u32,
    },

    #[error("{instance}: failed to terminate pid={pid} within grace period")]
    StopTimeout { instance: InstanceId, pid: u32 },

    #[error("{instance}: start skipped because stop failed: {cause}")]
    StartSkipped {
        instance: InstanceId,
        cause: Box<LifecycleError>,
    },
}

impl LifecycleError {
    /// Provisioning-class failures that must terminate the invoking command
    pub fn is_fatal(&self) -> bool {
        match self {
            LifecycleError::Discovery(_) | LifecycleError::UnsupportedKind { .. } => true,
            LifecycleError::Preflight(e) => e.is_fatal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let missing = PreflightError::Missing(ExistenceError::InstanceDirMissing {
            name: "a1".to_string(),
            path: PathBuf::from("/srv/instances/probe/a1"),
        });
        assert!(missing.is_fatal());
        assert!(LifecycleError::from(missing).is_fatal());

        assert!(!PreflightError::Disabled.is_fatal());
        assert!(!LifecycleError::from(PreflightError::Disabled).is_fatal());

        let timeout = LifecycleError::StopTimeout {
            instance: InstanceId::new("probe", "a1"),
            pid: 42,
        };
        assert!(!timeout.is_fatal());

        let skipped = LifecycleError::StartSkipped {
            instance: InstanceId::new("probe", "a1"),
            cause: Box::new(timeout),
        };
        assert!(!skipped.is_fatal());
        assert!(skipped.to_string().contains("start skipped because stop failed"));
        assert!(skipped.to_string().contains("failed to terminate pid=42"));
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = RcError::MissingVar {
            var: "LISTEN_PORT".to_string(),
            path: PathBuf::from("/srv/instances/probe/a1/probe.rc"),
        };
        assert_eq!(
            err.to_string(),
            "LISTEN_PORT definition missing in /srv/instances/probe/a1/probe.rc"
        );

        let err = LifecycleError::StartTimeout {
            instance: InstanceId::new("probe", "a1"),
            grace: Duration::from_secs(2),
            spawned_pid: 7,
        };
        assert!(err.to_string().contains("did not start within grace period"));
        assert!(err.to_string().contains("type=probe name=a1"));
    }
}
