//! Snapshot construction
//!
//! [`Inspector::snapshot`] is the single, repeatable way to obtain an
//! [`Instance`]: construction, rc resolution, command resolution and the
//! liveness probe, in that order. Callers re-snapshot after every
//! state-affecting step instead of mutating an old value.

use crate::error::{LifecycleError, Result};
use crate::instance::{Instance, InstanceId};
use crate::packages::{LaunchContext, PackageRef, Packages};
use crate::ports::ProcessTableRef;
use crate::process::{probe, Liveness};
use crate::rc::load_rc;
use std::path::{Path, PathBuf};
use svcctl_config::Settings;
use tracing::debug;

/// Builds instance snapshots against one root
#[derive(Clone)]
pub struct Inspector {
    root: PathBuf,
    packages: Packages,
    settings: Settings,
    table: ProcessTableRef,
}

impl Inspector {
    pub fn new(
        root: impl Into<PathBuf>,
        packages: Packages,
        settings: Settings,
        table: ProcessTableRef,
    ) -> Self {
        Self {
            root: root.into(),
            packages,
            settings,
            table,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn table(&self) -> &ProcessTableRef {
        &self.table
    }

    /// Descriptor for a kind, or `UnsupportedKind`
    pub fn package(&self, kind: &str) -> Result<PackageRef> {
        self.packages
            .get(kind)
            .ok_or_else(|| LifecycleError::UnsupportedKind {
                kind: kind.to_string(),
            })
    }

    /// Fresh point-in-time snapshot of one instance
    ///
    /// Configuration is only loaded for an existing instance. A config error
    /// is recorded on the snapshot and leaves it without a runtime pattern,
    /// so it is reported as not up. An unknown kind or an invalid pattern is
    /// returned as an error.
    pub fn snapshot(&self, kind: &str, name: &str) -> Result<Instance> {
        let mut instance = Instance::construct(&self.root, InstanceId::new(kind, name));
        let package = self.package(kind)?;

        instance.config.mandatory_vars = package
            .mandatory_vars()
            .iter()
            .map(|var| var.to_string())
            .collect();
        instance.config.grace = package
            .grace_periods()
            .with_overrides(self.settings.grace_overrides(kind));

        if instance.state.exists {
            match load_rc(&instance.workdir, kind, package.mandatory_vars()) {
                Ok(rc) => {
                    let ctx = LaunchContext {
                        root: &self.root,
                        workdir: &instance.workdir,
                        kind,
                        rc: &rc,
                    };
                    let startup_args = package.startup_args(&ctx);
                    let pattern = package.runtime_pattern(&ctx, &startup_args)?;

                    instance.config.package_version = Some(rc.package_version().to_string());
                    instance.config.startup_args = startup_args;
                    instance.config.runtime_pattern = Some(pattern);
                    instance.config.rc = rc;
                }
                Err(e) => instance.errors.config = Some(e),
            }
        }

        if let Some(pattern) = &instance.config.runtime_pattern {
            let liveness = probe(self.table.as_ref(), pattern);
            apply_liveness(&mut instance, &liveness);
        }

        debug!(
            instance = %instance.id,
            exists = instance.state.exists,
            enabled = instance.state.enabled,
            up = instance.state.up,
            pid = ?instance.state.pid,
            "Snapshot"
        );
        Ok(instance)
    }
}

fn apply_liveness(instance: &mut Instance, liveness: &Liveness) {
    instance.state.up = liveness.is_up();
    instance.state.pid = liveness.pid();
    instance.state.match_count = liveness.matches().len();
}
