//! Filesystem layout of an svcctl root
//!
//! ```text
//! <root>/instances/<kind>/<name>/                instance workdir
//! <root>/instances/<kind>/<name>/enabled.flag    presence => enabled
//! <root>/instances/<kind>/<name>/<kind>.rc       environment-style config
//! <root>/instances/<kind>/<name>/<kind>.log      startup stdout/stderr sink
//! <root>/packages/<kind>/<version>/...           installed package binaries
//! ```

use std::path::{Path, PathBuf};

use crate::constants::{
    ARCHIVED_LOGS_DIR_NAME, DATA_DIR_NAME, DOTFILE_NAME, ENABLED_FLAG_FILENAME,
    INSTANCES_DIR_NAME, LOG_EXTENSION, PACKAGES_DIR_NAME, RC_EXTENSION, SETTINGS_FILENAME,
};

/// Get the global dotfile path (`~/.svcctl`), if a home directory is known.
pub fn dotfile_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DOTFILE_NAME))
}

/// `<root>/instances`
pub fn instances_dir(root: &Path) -> PathBuf {
    root.join(INSTANCES_DIR_NAME)
}

/// `<root>/instances/<kind>`
pub fn kind_dir(root: &Path, kind: &str) -> PathBuf {
    instances_dir(root).join(kind)
}

/// `<root>/instances/<kind>/<name>`
pub fn workdir(root: &Path, kind: &str, name: &str) -> PathBuf {
    kind_dir(root, kind).join(name)
}

/// `<workdir>/enabled.flag`
pub fn enabled_flag(workdir: &Path) -> PathBuf {
    workdir.join(ENABLED_FLAG_FILENAME)
}

/// `<workdir>/<kind>.rc`
pub fn rc_file(workdir: &Path, kind: &str) -> PathBuf {
    workdir.join(format!("{}.{}", kind, RC_EXTENSION))
}

/// `<workdir>/<kind>.log`
pub fn log_file(workdir: &Path, kind: &str) -> PathBuf {
    workdir.join(format!("{}.{}", kind, LOG_EXTENSION))
}

/// `<workdir>/data/`
///
/// The trailing separator makes metadata lookups follow a `data` symlink.
pub fn data_dir(workdir: &Path) -> PathBuf {
    let mut path = workdir.join(DATA_DIR_NAME).into_os_string();
    path.push(std::path::MAIN_SEPARATOR_STR);
    PathBuf::from(path)
}

/// `<root>/packages/<kind>/<version>`
pub fn package_dir(root: &Path, kind: &str, version: &str) -> PathBuf {
    root.join(PACKAGES_DIR_NAME).join(kind).join(version)
}

/// `<root>/archived_logs`
pub fn archived_logs_dir(root: &Path) -> PathBuf {
    root.join(ARCHIVED_LOGS_DIR_NAME)
}

/// `<root>/svcctl.toml`
pub fn settings_file(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILENAME)
}
