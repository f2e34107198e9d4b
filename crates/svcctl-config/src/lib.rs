//! Configuration types and loading for svcctl
//!
//! This crate provides:
//! - Filesystem layout helpers for an svcctl root ([`paths`])
//! - Environment resolution: where the root lives ([`EnvResolver`])
//! - Optional controller settings loaded from `<root>/svcctl.toml`
//!
//! # Usage
//!
//! ```rust,ignore
//! use svcctl_config::{load_settings, EnvResolver};
//!
//! let env = EnvResolver::from_process().resolve()?;
//! let settings = load_settings(env.root())?;
//! ```

mod env;
mod loader;
mod settings;

// Default constants for all configuration values
pub mod constants;

// Path utilities
pub mod paths;

pub use env::{EnvError, EnvResolver, Environment, RootSource};
pub use loader::{load_settings, load_settings_from_str, SettingsError};
pub use settings::{GraceOverrides, Settings, TimingConfig};

pub use constants::{DEFAULT_PACKAGE_VERSION, ENV_INSTANCE_PACKAGE_VERSION, ENV_SVCCTL_HOME};
