//! Default constants for svcctl configuration
//!
//! Single source of truth for filenames, environment variable names and
//! timing defaults used throughout the workspace.

// ============================================================================
// ENVIRONMENT VARIABLES
// ============================================================================

/// Root directory override, read from the process environment or the dotfile
pub const ENV_SVCCTL_HOME: &str = "SVCCTL_HOME";

/// Per-instance rc variable selecting the package version directory
pub const ENV_INSTANCE_PACKAGE_VERSION: &str = "INSTANCE_PACKAGE_VERSION";

/// Package version used when the rc file does not set one
pub const DEFAULT_PACKAGE_VERSION: &str = "active_prod";

// ============================================================================
// FILESYSTEM LAYOUT
// ============================================================================

/// Global dotfile under the user's home directory
pub const DOTFILE_NAME: &str = ".svcctl";

/// Controller settings file under the root (optional)
pub const SETTINGS_FILENAME: &str = "svcctl.toml";

/// Directory under the root holding one subdirectory per instance kind
pub const INSTANCES_DIR_NAME: &str = "instances";

/// Directory under the root holding installed package versions
pub const PACKAGES_DIR_NAME: &str = "packages";

/// Directory under the root holding rotated logs (reported, never managed)
pub const ARCHIVED_LOGS_DIR_NAME: &str = "archived_logs";

/// Marker file whose presence enables an instance
pub const ENABLED_FLAG_FILENAME: &str = "enabled.flag";

/// Extension of the per-instance environment file (`<kind>.rc`)
pub const RC_EXTENSION: &str = "rc";

/// Extension of the per-instance startup log (`<kind>.log`)
pub const LOG_EXTENSION: &str = "log";

/// Instance data directory (may be a symlink)
pub const DATA_DIR_NAME: &str = "data";

// ============================================================================
// TIMING
// ============================================================================

/// Interval between process-table polls while waiting for a transition
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Delay between spawning a process and the first liveness poll
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;
