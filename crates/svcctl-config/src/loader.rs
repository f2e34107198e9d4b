//! Settings file loading and validation
//!
//! - [`load_settings`] - Reads `<root>/svcctl.toml`, defaults when absent
//! - [`load_settings_from_str`] - Parses and validates TOML content

use crate::paths::settings_file;
use crate::settings::Settings;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors that can occur during settings loading
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Validation(String),
}

/// Load controller settings for a root
///
/// A missing settings file is not an error: defaults are returned.
pub fn load_settings(root: &Path) -> Result<Settings, SettingsError> {
    let path = settings_file(root);
    if !path.exists() {
        debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(Settings::default());
    }

    debug!(path = %path.display(), "Loading settings file");
    let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::Io {
        path: path.clone(),
        source,
    })?;
    load_settings_from_str(&content)
}

/// Load settings from a TOML string
pub fn load_settings_from_str(content: &str) -> Result<Settings, SettingsError> {
    let settings: Settings = toml::from_str(content)?;
    let errors = settings.validate();
    if errors.is_empty() {
        Ok(settings)
    } else {
        Err(SettingsError::Validation(errors.join("; ")))
    }
}
