//! Controller settings (`<root>/svcctl.toml`)
//!
//! Every field is optional. A root without a settings file behaves exactly as
//! one with an empty file.
//!
//! ```toml
//! [timing]
//! poll_interval_ms = 50
//! settle_delay_ms = 100
//!
//! [packages.logstash]
//! startup_grace_secs = 20
//! ```

use crate::constants::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Top-level controller settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Poll and settle timing
    #[serde(default)]
    pub timing: TimingConfig,
    /// Grace period overrides by instance kind
    #[serde(default)]
    pub packages: BTreeMap<String, GraceOverrides>,
}

impl Settings {
    /// Grace overrides configured for a kind, if any
    pub fn grace_overrides(&self, kind: &str) -> Option<&GraceOverrides> {
        self.packages.get(kind)
    }

    /// Collect every validation problem (empty when valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.timing.poll_interval_ms == 0 {
            errors.push("timing.poll_interval_ms must be greater than 0".to_string());
        }

        for (kind, grace) in &self.packages {
            let fields = [
                ("startup_grace_secs", grace.startup_grace_secs),
                ("sigterm_grace_secs", grace.sigterm_grace_secs),
                ("sigkill_grace_secs", grace.sigkill_grace_secs),
            ];
            for (field, value) in fields {
                if value == Some(0) {
                    errors.push(format!(
                        "packages.{}.{} must be greater than 0",
                        kind, field
                    ));
                }
            }
        }

        errors
    }
}

/// Poll and settle timing used by the lifecycle controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Interval between process-table polls (default: 50ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay after spawn before the first liveness poll (default: 100ms)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Per-kind grace period overrides; unset fields keep the package defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraceOverrides {
    #[serde(default)]
    pub startup_grace_secs: Option<u64>,
    #[serde(default)]
    pub sigterm_grace_secs: Option<u64>,
    #[serde(default)]
    pub sigkill_grace_secs: Option<u64>,
}
