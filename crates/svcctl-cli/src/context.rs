//! CLI Context - shared state for all commands
//!
//! Created once at startup from the resolved root and its settings, passed
//! to every command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use svcctl_config::{load_settings, EnvError, EnvResolver, Environment, SettingsError};
use svcctl_core::{
    Inspector, LifecycleController, Packages, ProcessTableRef, SystemLauncher,
    SystemProcessTable,
};

/// Shared context for CLI commands
#[derive(Clone)]
pub struct CliContext {
    /// Resolved root and where it came from
    pub env: Environment,
    /// Controller wired to the live process table
    pub controller: LifecycleController,
}

impl CliContext {
    /// Resolve the root, load its settings and wire the system process ports
    ///
    /// Root resolution order:
    /// 1. `--root <path>` CLI argument
    /// 2. `SVCCTL_HOME` environment variable
    /// 3. `SVCCTL_HOME` in `~/.svcctl`
    pub fn new(root: Option<PathBuf>) -> Result<Self, CliContextError> {
        let env = EnvResolver::from_process().with_root(root).resolve()?;
        Self::with_env(env)
    }

    /// Build the context for an already resolved environment
    pub fn with_env(env: Environment) -> Result<Self, CliContextError> {
        let settings = load_settings(env.root()).map_err(|source| CliContextError::Settings {
            root: env.root().to_path_buf(),
            source,
        })?;

        let table: ProcessTableRef = Arc::new(SystemProcessTable::new());
        let inspector = Inspector::new(env.root(), Packages::builtin(), settings, table);
        let controller = LifecycleController::new(inspector, Arc::new(SystemLauncher::new()));

        Ok(Self { env, controller })
    }

    pub fn root(&self) -> &Path {
        self.env.root()
    }

    pub fn inspector(&self) -> &Inspector {
        self.controller.inspector()
    }
}

/// Errors that can occur when creating the CLI context
#[derive(Debug, thiserror::Error)]
pub enum CliContextError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Failed to load settings under {root}: {source}")]
    Settings {
        root: PathBuf,
        #[source]
        source: SettingsError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcctl_config::RootSource;
    use tempfile::TempDir;

    #[test]
    fn test_context_without_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let env = Environment::new(temp_dir.path(), RootSource::CommandLine);

        let ctx = CliContext::with_env(env).unwrap();
        assert_eq!(ctx.root(), temp_dir.path());
        assert_eq!(ctx.inspector().root(), temp_dir.path());
    }

    #[test]
    fn test_context_rejects_invalid_settings() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("svcctl.toml"),
            "[timing]\npoll_interval_ms = 0\n",
        )
        .unwrap();
        let env = Environment::new(temp_dir.path(), RootSource::CommandLine);

        let err = CliContext::with_env(env).err().unwrap();
        assert!(matches!(err, CliContextError::Settings { .. }));
    }
}
