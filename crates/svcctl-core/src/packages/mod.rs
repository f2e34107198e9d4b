//! Package descriptors
//!
//! A package descriptor turns a resolved instance configuration into the
//! concrete startup command and the runtime pattern that recognizes the live
//! process. One [`Package`] implementation exists per supported instance
//! kind. Adding a manageable service means adding a descriptor and
//! registering it; the lifecycle controller is never modified.
//!
//! Built-in descriptors:
//! - [`Logstash`]: JVM log shipper, launched through a script that execs java
//! - [`Netprobe`]: native monitoring probe
//! - [`NodeExporter`]: native metrics exporter

mod logstash;
mod netprobe;
mod node_exporter;

pub use logstash::Logstash;
pub use netprobe::Netprobe;
pub use node_exporter::NodeExporter;

use crate::error::PatternError;
use crate::instance::GracePeriods;
use crate::pattern::RuntimePattern;
use crate::rc::RcValues;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use svcctl_config::paths;

/// Thread-safe reference to a package descriptor
pub type PackageRef = Arc<dyn Package>;

/// Everything a descriptor may read while building commands
#[derive(Debug, Clone, Copy)]
pub struct LaunchContext<'a> {
    pub root: &'a Path,
    pub workdir: &'a Path,
    pub kind: &'a str,
    pub rc: &'a RcValues,
}

impl<'a> LaunchContext<'a> {
    /// Resolved rc value; empty when unset (mandatory vars are validated
    /// before a descriptor is consulted)
    pub fn var(&self, name: &str) -> &'a str {
        self.rc.get(name).unwrap_or_default()
    }

    pub fn package_version(&self) -> &'a str {
        self.rc.package_version()
    }

    /// `<root>/packages/<kind>/<version>`
    pub fn package_dir(&self) -> PathBuf {
        paths::package_dir(self.root, self.kind, self.package_version())
    }

    /// Path under the instance workdir, rendered for an argv
    pub fn workdir_path(&self, rel: &str) -> String {
        self.workdir.join(rel).display().to_string()
    }
}

/// Per-kind startup contract
pub trait Package: Send + Sync {
    /// Instance kind this descriptor handles
    fn kind(&self) -> &'static str;

    /// rc variables that must be present and non-empty
    fn mandatory_vars(&self) -> &'static [&'static str];

    /// Built-in grace periods for this kind
    fn grace_periods(&self) -> GracePeriods;

    /// Full startup argument vector, argv[0] being the package binary
    fn startup_args(&self, ctx: &LaunchContext<'_>) -> Vec<String>;

    /// Pattern recognizing the live process. Defaults to the literal startup
    /// command.
    fn runtime_pattern(
        &self,
        _ctx: &LaunchContext<'_>,
        startup_args: &[String],
    ) -> Result<RuntimePattern, PatternError> {
        RuntimePattern::literal(startup_args.iter().cloned())
    }
}

impl fmt::Debug for dyn Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package").field("kind", &self.kind()).finish()
    }
}

/// Registry of package descriptors keyed by instance kind
#[derive(Clone, Default)]
pub struct Packages {
    by_kind: BTreeMap<&'static str, PackageRef>,
}

impl Packages {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in descriptor
    pub fn builtin() -> Self {
        let mut packages = Self::new();
        packages.register(Arc::new(Logstash));
        packages.register(Arc::new(Netprobe));
        packages.register(Arc::new(NodeExporter));
        packages
    }

    /// Add (or replace) the descriptor for its kind
    pub fn register(&mut self, package: PackageRef) {
        self.by_kind.insert(package.kind(), package);
    }

    pub fn get(&self, kind: &str) -> Option<PackageRef> {
        self.by_kind.get(kind).cloned()
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_kind.keys().copied()
    }
}

impl fmt::Debug for Packages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.by_kind.keys()).finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn rc(pairs: &[(&str, &str)]) -> RcValues {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    pub fn ctx<'a>(root: &'a Path, workdir: &'a Path, kind: &'a str, rc: &'a RcValues) -> LaunchContext<'a> {
        LaunchContext {
            root,
            workdir,
            kind,
            rc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let packages = Packages::builtin();
        let kinds: Vec<_> = packages.kinds().collect();
        assert_eq!(kinds, vec!["logstash", "netprobe", "node_exporter"]);
        assert!(packages.get("postgres").is_none());
    }

    #[test]
    fn test_every_package_declares_a_port() {
        let packages = Packages::builtin();
        for kind in packages.kinds() {
            let package = packages.get(kind).unwrap();
            assert_eq!(package.kind(), kind);
            assert!(package
                .mandatory_vars()
                .iter()
                .any(|var| var.ends_with("_PORT")));
        }
    }

    #[test]
    fn test_register_replaces_existing_kind() {
        struct Quick;
        impl Package for Quick {
            fn kind(&self) -> &'static str {
                "netprobe"
            }
            fn mandatory_vars(&self) -> &'static [&'static str] {
                &[]
            }
            fn grace_periods(&self) -> GracePeriods {
                GracePeriods::from_secs(1, 1, 1)
            }
            fn startup_args(&self, _ctx: &LaunchContext<'_>) -> Vec<String> {
                vec!["/bin/true".to_string()]
            }
        }

        let mut packages = Packages::builtin();
        packages.register(Arc::new(Quick));
        let netprobe = packages.get("netprobe").unwrap();
        assert_eq!(netprobe.grace_periods(), GracePeriods::from_secs(1, 1, 1));
    }

    #[test]
    fn test_context_package_dir_uses_resolved_version() {
        let values = rc(&[("INSTANCE_PACKAGE_VERSION", "2.1.0")]);
        let ctx = ctx(
            Path::new("/srv"),
            Path::new("/srv/instances/netprobe/a1"),
            "netprobe",
            &values,
        );
        assert_eq!(ctx.package_dir(), PathBuf::from("/srv/packages/netprobe/2.1.0"));
        assert_eq!(ctx.var("MISSING"), "");
    }
}
