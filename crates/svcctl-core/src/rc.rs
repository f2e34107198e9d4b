//! Per-instance rc file loading
//!
//! The rc file (`<workdir>/<kind>.rc`) is an environment-style file. It is
//! parsed into a local map on every call; nothing is read from or written to
//! the process environment, so repeated loads in one process always see the
//! file and nothing else.

use crate::error::RcError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use svcctl_config::{paths, DEFAULT_PACKAGE_VERSION, ENV_INSTANCE_PACKAGE_VERSION};
use tracing::debug;

/// Resolved rc values, ordered by variable name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RcValues(BTreeMap<String, String>);

impl RcValues {
    /// Value of a variable, if resolved
    pub fn get(&self, var: &str) -> Option<&str> {
        self.0.get(var).map(String::as_str)
    }

    /// Resolved package version (always present after a successful load)
    pub fn package_version(&self) -> &str {
        self.get(ENV_INSTANCE_PACKAGE_VERSION)
            .unwrap_or(DEFAULT_PACKAGE_VERSION)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RcValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Load and validate an instance rc file
///
/// Returns the mandatory variables plus `INSTANCE_PACKAGE_VERSION`, which
/// defaults to `active_prod` when the file does not set it. The first missing
/// (or empty) mandatory variable fails the load.
pub fn load_rc(workdir: &Path, kind: &str, mandatory_vars: &[&str]) -> Result<RcValues, RcError> {
    let path = paths::rc_file(workdir, kind);
    let unreadable = |e: dotenvy::Error| RcError::Unreadable {
        path: path.clone(),
        reason: e.to_string(),
    };

    debug!(path = %path.display(), "Loading instance rc file");
    let parsed: HashMap<String, String> = dotenvy::from_path_iter(&path)
        .map_err(unreadable)?
        .collect::<Result<_, _>>()
        .map_err(unreadable)?;

    let mut values = BTreeMap::new();
    for var in mandatory_vars {
        match parsed.get(*var).filter(|v| !v.is_empty()) {
            Some(value) => {
                values.insert((*var).to_string(), value.clone());
            }
            None => {
                return Err(RcError::MissingVar {
                    var: (*var).to_string(),
                    path,
                })
            }
        }
    }

    let version = parsed
        .get(ENV_INSTANCE_PACKAGE_VERSION)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_PACKAGE_VERSION.to_string());
    values.insert(ENV_INSTANCE_PACKAGE_VERSION.to_string(), version);

    Ok(RcValues(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_rc(dir: &TempDir, content: &str) {
        std::fs::write(dir.path().join("probe.rc"), content).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_rc(dir.path(), "probe", &["LISTEN_PORT"]).unwrap_err();

        assert!(matches!(err, RcError::Unreadable { .. }));
        assert!(err.to_string().contains("probe.rc"));
    }

    #[test]
    fn test_missing_mandatory_var_names_var_and_file() {
        let dir = TempDir::new().unwrap();
        write_rc(&dir, "OTHER=1\n");

        let err = load_rc(dir.path(), "probe", &["LISTEN_PORT"]).unwrap_err();
        let expected_path = dir.path().join("probe.rc");
        assert_eq!(
            err,
            RcError::MissingVar {
                var: "LISTEN_PORT".to_string(),
                path: expected_path.clone(),
            }
        );
        assert!(err.to_string().contains("LISTEN_PORT"));
        assert!(err.to_string().contains(&expected_path.display().to_string()));
    }

    #[test]
    fn test_first_missing_var_is_reported() {
        let dir = TempDir::new().unwrap();
        write_rc(&dir, "B=2\n");

        let err = load_rc(dir.path(), "probe", &["A", "B", "C"]).unwrap_err();
        assert!(matches!(err, RcError::MissingVar { ref var, .. } if var == "A"));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        write_rc(&dir, "LISTEN_PORT=\n");

        let err = load_rc(dir.path(), "probe", &["LISTEN_PORT"]).unwrap_err();
        assert!(matches!(err, RcError::MissingVar { .. }));
    }

    #[test]
    fn test_default_package_version() {
        let dir = TempDir::new().unwrap();
        write_rc(&dir, "LISTEN_PORT=9100\nUNRELATED=x\n");

        let values = load_rc(dir.path(), "probe", &["LISTEN_PORT"]).unwrap();
        assert_eq!(values.get("LISTEN_PORT"), Some("9100"));
        assert_eq!(values.package_version(), "active_prod");
        assert_eq!(values.get(ENV_INSTANCE_PACKAGE_VERSION), Some("active_prod"));
        // Only mandatory vars and the version are kept
        assert_eq!(values.get("UNRELATED"), None);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_explicit_package_version() {
        let dir = TempDir::new().unwrap();
        write_rc(
            &dir,
            "# pinned\nLISTEN_PORT=9100\nINSTANCE_PACKAGE_VERSION=\"1.4.2\"\n",
        );

        let values = load_rc(dir.path(), "probe", &["LISTEN_PORT"]).unwrap();
        assert_eq!(values.package_version(), "1.4.2");
    }

    #[test]
    fn test_repeated_loads_ignore_process_environment() {
        let dir = TempDir::new().unwrap();
        write_rc(&dir, "SVCCTL_RC_TEST_PORT=9100\n");

        // A stale value in the process environment must not leak in, and a
        // load must not leave its values behind.
        std::env::set_var(ENV_INSTANCE_PACKAGE_VERSION, "stale");
        let first = load_rc(dir.path(), "probe", &["SVCCTL_RC_TEST_PORT"]).unwrap();
        let second = load_rc(dir.path(), "probe", &["SVCCTL_RC_TEST_PORT"]).unwrap();
        std::env::remove_var(ENV_INSTANCE_PACKAGE_VERSION);

        assert_eq!(first, second);
        assert_eq!(first.package_version(), "active_prod");
        assert!(std::env::var_os("SVCCTL_RC_TEST_PORT").is_none());
    }
}
