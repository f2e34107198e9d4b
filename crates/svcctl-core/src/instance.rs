//! Instance model
//!
//! An [`Instance`] is a point-in-time snapshot of one (kind, name) pair. It
//! is never mutated across a lifecycle boundary: callers re-derive a fresh
//! snapshot after every state-affecting step (see [`crate::Inspector`]).

use crate::error::{EnablementError, ExistenceError, PreflightError, RcError};
use crate::pattern::RuntimePattern;
use crate::rc::RcValues;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use svcctl_config::paths;
use tracing::{info, warn};

/// Identity of an instance: `(kind, name)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InstanceId {
    /// Instance type, selects the package variant (`type` on disk and in the CLI)
    #[serde(rename = "type")]
    pub kind: String,
    /// Instance name, unique within its kind
    pub name: String,
}

impl InstanceId {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type={} name={}", self.kind, self.name)
    }
}

/// Grace periods bounding each lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GracePeriods {
    /// Time allowed for a spawned process to appear
    pub startup: Duration,
    /// Time allowed for a graceful exit after SIGTERM
    pub sigterm: Duration,
    /// Time allowed for the exit after SIGKILL
    pub sigkill: Duration,
}

impl GracePeriods {
    pub const fn from_secs(startup: u64, sigterm: u64, sigkill: u64) -> Self {
        Self {
            startup: Duration::from_secs(startup),
            sigterm: Duration::from_secs(sigterm),
            sigkill: Duration::from_secs(sigkill),
        }
    }

    /// Apply per-kind overrides from the settings file
    pub fn with_overrides(mut self, overrides: Option<&svcctl_config::GraceOverrides>) -> Self {
        if let Some(o) = overrides {
            if let Some(secs) = o.startup_grace_secs {
                self.startup = Duration::from_secs(secs);
            }
            if let Some(secs) = o.sigterm_grace_secs {
                self.sigterm = Duration::from_secs(secs);
            }
            if let Some(secs) = o.sigkill_grace_secs {
                self.sigkill = Duration::from_secs(secs);
            }
        }
        self
    }
}

/// Resolved configuration of an instance
#[derive(Debug, Clone, Serialize)]
pub struct InstanceConfig {
    /// rc variables the package requires
    pub mandatory_vars: Vec<String>,
    /// Resolved rc values (mandatory variables plus the package version)
    pub rc: RcValues,
    /// Resolved package version
    pub package_version: Option<String>,
    /// Startup argument vector
    pub startup_args: Vec<String>,
    /// Pattern recognizing the live process
    pub runtime_pattern: Option<RuntimePattern>,
    /// Grace periods for this kind, overrides applied
    pub grace: GracePeriods,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            mandatory_vars: Vec::new(),
            rc: RcValues::default(),
            package_version: None,
            startup_args: Vec::new(),
            runtime_pattern: None,
            grace: GracePeriods::from_secs(0, 0, 0),
        }
    }
}

/// Observed state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceState {
    /// Workdir present and well-formed
    pub exists: bool,
    /// `enabled.flag` present (only evaluated when `exists`)
    pub enabled: bool,
    /// Exactly one live process matches the runtime pattern
    pub up: bool,
    /// Pid of that process, only set when `up`
    pub pid: Option<u32>,
    /// Raw number of matching processes at probe time.
    /// More than one match is reported as not up.
    pub match_count: usize,
}

/// Independent, non-fatal error slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceErrors {
    #[serde(serialize_with = "serialize_display")]
    pub exists: Option<ExistenceError>,
    #[serde(serialize_with = "serialize_display")]
    pub enabled: Option<EnablementError>,
    #[serde(serialize_with = "serialize_display")]
    pub config: Option<RcError>,
}

fn serialize_display<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::Display,
{
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_none(),
    }
}

/// Snapshot of one service instance
#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    #[serde(flatten)]
    pub id: InstanceId,
    pub workdir: PathBuf,
    pub config: InstanceConfig,
    pub state: InstanceState,
    pub errors: InstanceErrors,
}

impl Instance {
    /// Build the generic part of a snapshot: identity, workdir, existence and
    /// enablement. Configuration and liveness are resolved by the
    /// [`Inspector`](crate::Inspector).
    pub fn construct(root: &Path, id: InstanceId) -> Self {
        let workdir = paths::workdir(root, &id.kind, &id.name);
        let mut instance = Self {
            id,
            workdir,
            config: InstanceConfig::default(),
            state: InstanceState::default(),
            errors: InstanceErrors::default(),
        };

        match check_exists(root, &instance.id, &instance.workdir) {
            Ok(()) => instance.state.exists = true,
            Err(e) => instance.errors.exists = Some(e),
        }

        if instance.state.exists {
            match check_enabled(&instance.workdir) {
                Ok(()) => instance.state.enabled = true,
                Err(e) => instance.errors.enabled = Some(e),
            }
        }

        instance
    }

    /// Precondition gate run before a lifecycle action
    ///
    /// Checks existence, then configuration, then enablement, and logs the
    /// first failure. A missing instance is fatal for the invoking command;
    /// the other failures are reported.
    pub fn preflight(&self) -> Result<(), PreflightError> {
        let result = if !self.state.exists {
            Err(PreflightError::Missing(self.errors.exists.clone().unwrap_or_else(
                || ExistenceError::InstanceDirMissing {
                    name: self.id.name.clone(),
                    path: self.workdir.clone(),
                },
            )))
        } else if let Some(e) = &self.errors.config {
            Err(PreflightError::Config(e.clone()))
        } else if !self.state.enabled {
            Err(PreflightError::Disabled)
        } else {
            Ok(())
        };

        if let Err(e) = &result {
            warn!(instance = %self.id, "{}", e);
        }
        result
    }

    /// Log a message tagged with this instance
    pub fn log(&self, msg: &str) {
        info!(instance = %self.id, "{}", msg);
    }
}

fn check_exists(root: &Path, id: &InstanceId, workdir: &Path) -> Result<(), ExistenceError> {
    let kind_dir = paths::kind_dir(root, &id.kind);
    match std::fs::metadata(&kind_dir) {
        Err(_) => {
            return Err(ExistenceError::KindDirMissing {
                kind: id.kind.clone(),
                path: kind_dir,
            })
        }
        Ok(meta) if !meta.is_dir() => {
            return Err(ExistenceError::KindDirNotDir { path: kind_dir });
        }
        Ok(_) => {}
    }

    match std::fs::metadata(workdir) {
        Err(_) => Err(ExistenceError::InstanceDirMissing {
            name: id.name.clone(),
            path: workdir.to_path_buf(),
        }),
        Ok(meta) if !meta.is_dir() => Err(ExistenceError::InstanceDirNotDir {
            path: workdir.to_path_buf(),
        }),
        Ok(_) => Ok(()),
    }
}

fn check_enabled(workdir: &Path) -> Result<(), EnablementError> {
    match std::fs::metadata(paths::enabled_flag(workdir)) {
        Err(_) => Err(EnablementError::FlagMissing {
            workdir: workdir.to_path_buf(),
        }),
        Ok(meta) if meta.is_dir() => Err(EnablementError::FlagIsDir {
            workdir: workdir.to_path_buf(),
        }),
        Ok(_) => Ok(()),
    }
}
