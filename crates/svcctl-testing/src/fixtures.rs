//! Instance tree fixtures
//!
//! Builds `<root>/instances/<kind>/<name>` layouts in a temporary directory.
//!
//! ```rust,ignore
//! let tree = InstanceTree::new();
//! tree.instance("netprobe", "a1")
//!     .enabled()
//!     .rc(&[("NETPROBE_LISTEN_PORT", "7036")])
//!     .create();
//! ```

use crate::mocks::MockProcessHost;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use svcctl_config::{paths, Environment, RootSource, Settings};
use svcctl_core::{Inspector, LifecycleController, Packages};
use tempfile::TempDir;

/// Temporary svcctl root, removed on drop
#[derive(Debug)]
pub struct InstanceTree {
    dir: TempDir,
}

impl InstanceTree {
    /// Create an empty root with an empty `instances` directory
    pub fn new() -> Self {
        let tree = Self::bare();
        create_dir(&paths::instances_dir(tree.root()));
        tree
    }

    /// Create an empty root without any layout
    pub fn bare() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("svcctl-")
            .tempdir()
            .unwrap_or_else(|e| panic!("failed to create temp root: {}", e));
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn env(&self) -> Environment {
        Environment::new(self.root(), RootSource::CommandLine)
    }

    pub fn workdir(&self, kind: &str, name: &str) -> PathBuf {
        paths::workdir(self.root(), kind, name)
    }

    /// Start describing an instance
    pub fn instance<'a>(&'a self, kind: &str, name: &str) -> InstanceBuilder<'a> {
        InstanceBuilder {
            tree: self,
            kind: kind.to_string(),
            name: name.to_string(),
            enabled: false,
            rc: None,
        }
    }

    /// Enabled netprobe instance listening on `port`
    pub fn netprobe(&self, name: &str, port: u16) -> InstanceBuilder<'_> {
        let port = port.to_string();
        self.instance("netprobe", name)
            .enabled()
            .rc(&[("NETPROBE_LISTEN_PORT", port.as_str())])
    }

    /// Write an executable under `<root>/packages/<kind>/<version>/<rel>`
    pub fn install_package(&self, kind: &str, version: &str, rel: &str, content: &str) -> PathBuf {
        let path = paths::package_dir(self.root(), kind, version).join(rel);
        if let Some(parent) = path.parent() {
            create_dir(parent);
        }
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .unwrap_or_else(|e| panic!("failed to chmod {}: {}", path.display(), e));
        }
        path
    }

    pub fn inspector(&self, host: Arc<MockProcessHost>) -> Inspector {
        self.inspector_with(Settings::default(), host)
    }

    pub fn inspector_with(&self, settings: Settings, host: Arc<MockProcessHost>) -> Inspector {
        Inspector::new(self.root(), Packages::builtin(), settings, host)
    }

    /// Controller whose process table and launcher are both `host`
    pub fn controller(&self, host: Arc<MockProcessHost>) -> LifecycleController {
        self.controller_with(Settings::default(), host)
    }

    pub fn controller_with(
        &self,
        settings: Settings,
        host: Arc<MockProcessHost>,
    ) -> LifecycleController {
        LifecycleController::new(self.inspector_with(settings, host.clone()), host)
    }
}

impl Default for InstanceTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one instance workdir
#[derive(Debug)]
pub struct InstanceBuilder<'a> {
    tree: &'a InstanceTree,
    kind: String,
    name: String,
    enabled: bool,
    rc: Option<Vec<(String, String)>>,
}

impl InstanceBuilder<'_> {
    /// Create `enabled.flag`
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Write `<kind>.rc` with these variables
    pub fn rc(mut self, vars: &[(&str, &str)]) -> Self {
        self.rc = Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Do not write an rc file
    pub fn without_rc(mut self) -> Self {
        self.rc = None;
        self
    }

    /// Create the workdir. Returns its path.
    pub fn create(self) -> PathBuf {
        let workdir = self.tree.workdir(&self.kind, &self.name);
        create_dir(&workdir);

        if self.enabled {
            write(&paths::enabled_flag(&workdir), "");
        }
        if let Some(vars) = &self.rc {
            let content: String = vars
                .iter()
                .map(|(k, v)| format!("{}={}\n", k, v))
                .collect();
            write(&paths::rc_file(&workdir, &self.kind), &content);
        }
        workdir
    }
}

fn create_dir(path: &Path) {
    std::fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("failed to create {}: {}", path.display(), e));
}

fn write(path: &Path, content: &str) {
    std::fs::write(path, content)
        .unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
}
