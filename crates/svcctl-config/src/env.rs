//! Environment resolution
//!
//! Determines the root directory under which all instance data lives.
//!
//! Resolution order:
//! 1. Explicit root (`--root` on the command line)
//! 2. `SVCCTL_HOME` in the process environment
//! 3. `SVCCTL_HOME` in the `~/.svcctl` dotfile
//!
//! The dotfile is parsed into a local map; the process environment is never
//! modified.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::ENV_SVCCTL_HOME;
use crate::paths;

/// Where the root directory came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    /// `--root` command-line argument
    CommandLine,
    /// `SVCCTL_HOME` process environment variable
    EnvVar,
    /// `SVCCTL_HOME` entry of the dotfile at this path
    Dotfile(PathBuf),
}

impl fmt::Display for RootSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootSource::CommandLine => write!(f, "--root"),
            RootSource::EnvVar => write!(f, "${}", ENV_SVCCTL_HOME),
            RootSource::Dotfile(path) => write!(f, "{} in {}", ENV_SVCCTL_HOME, path.display()),
        }
    }
}

/// Errors that can occur while resolving the environment
///
/// All of these are fatal: nothing can be discovered without a root.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("Unable to locate the user's home directory to read the svcctl dotfile")]
    NoHomeDir,

    #[error("Unable to read {path}: {reason}")]
    Dotfile { path: PathBuf, reason: String },

    #[error("{var} value not set in {path}", var = ENV_SVCCTL_HOME)]
    HomeNotSet { path: PathBuf },

    #[error("{origin} points to inexisting path={path}")]
    RootMissing { origin: RootSource, path: PathBuf },

    #[error("{origin} does not point to a directory path={path}")]
    RootNotDir { origin: RootSource, path: PathBuf },
}

/// Resolved environment shared by every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    root: PathBuf,
    source: RootSource,
}

impl Environment {
    /// Build an environment from an already validated root
    pub fn new(root: impl Into<PathBuf>, source: RootSource) -> Self {
        Self {
            root: root.into(),
            source,
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the root came from
    pub fn source(&self) -> &RootSource {
        &self.source
    }

    /// `<root>/instances`
    pub fn instances_dir(&self) -> PathBuf {
        paths::instances_dir(&self.root)
    }
}

/// Resolves the root directory from its possible sources
///
/// ```rust,ignore
/// let env = EnvResolver::from_process().with_root(cli.root.clone()).resolve()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    explicit: Option<PathBuf>,
    env_value: Option<OsString>,
    dotfile: Option<PathBuf>,
}

impl EnvResolver {
    /// Resolver with no sources configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver reading `SVCCTL_HOME` from the process environment and
    /// `~/.svcctl` as the dotfile
    pub fn from_process() -> Self {
        Self {
            explicit: None,
            env_value: std::env::var_os(ENV_SVCCTL_HOME).filter(|v| !v.is_empty()),
            dotfile: paths::dotfile_path(),
        }
    }

    /// Set (or clear) the explicit root
    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        self.explicit = root;
        self
    }

    /// Set (or clear) the environment variable value
    pub fn with_env_value(mut self, value: Option<OsString>) -> Self {
        self.env_value = value.filter(|v| !v.is_empty());
        self
    }

    /// Set the dotfile path
    pub fn with_dotfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotfile = Some(path.into());
        self
    }

    /// Resolve and validate the root directory
    pub fn resolve(&self) -> Result<Environment, EnvError> {
        let (root, source) = if let Some(root) = &self.explicit {
            (root.clone(), RootSource::CommandLine)
        } else if let Some(value) = &self.env_value {
            (PathBuf::from(value), RootSource::EnvVar)
        } else {
            let dotfile = self.dotfile.clone().ok_or(EnvError::NoHomeDir)?;
            let vars = read_dotfile(&dotfile)?;
            match vars.get(ENV_SVCCTL_HOME).filter(|v| !v.is_empty()) {
                Some(value) => (PathBuf::from(value), RootSource::Dotfile(dotfile)),
                None => return Err(EnvError::HomeNotSet { path: dotfile }),
            }
        };

        let metadata = std::fs::metadata(&root).map_err(|_| EnvError::RootMissing {
            origin: source.clone(),
            path: root.clone(),
        })?;
        if !metadata.is_dir() {
            return Err(EnvError::RootNotDir {
                origin: source,
                path: root,
            });
        }

        debug!(root = %root.display(), source = %source, "Resolved svcctl root");
        Ok(Environment::new(root, source))
    }
}

/// Parse an env-style file into a map without touching the process environment
fn read_dotfile(path: &Path) -> Result<HashMap<String, String>, EnvError> {
    let to_error = |e: dotenvy::Error| EnvError::Dotfile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    dotenvy::from_path_iter(path)
        .map_err(to_error)?
        .map(|item| item.map_err(to_error))
        .collect()
}
