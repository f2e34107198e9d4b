//! Logging setup shared by svcctl binaries and tests
//!
//! svcctl prints reports on stdout, so log lines go to stderr unless asked
//! otherwise. Levels apply to the svcctl crates only; everything else stays
//! at `warn`.
//!
//! ```rust,ignore
//! use svcctl_logging::{init, LogConfig};
//!
//! init(LogConfig::cli(debug));
//! init(LogConfig::new().default_level("warn").utc());
//! ```
//!
//! The tracing macros are re-exported so binaries only depend on this crate.

use std::io::IsTerminal;
use tracing_subscriber::{
    fmt::{
        self,
        time::{LocalTime, UtcTime},
        writer::BoxMakeWriter,
    },
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

pub use tracing::{debug, error, info, instrument, span, trace, warn, Level};

/// Crates whose level follows `--debug` and the default level
const SVCCTL_TARGETS: [&str; 5] = [
    "svcctl",
    "svcctl_cli",
    "svcctl_config",
    "svcctl_core",
    "svcctl_testing",
];

/// Level for every other crate
const OTHER_TARGETS_LEVEL: &str = "warn";

/// Where log lines are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    /// Keeps stdout free for reports
    #[default]
    Stderr,
}

impl LogOutput {
    fn is_terminal(self) -> bool {
        match self {
            LogOutput::Stdout => std::io::stdout().is_terminal(),
            LogOutput::Stderr => std::io::stderr().is_terminal(),
        }
    }

    fn writer(self) -> BoxMakeWriter {
        match self {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Timezone of log timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    #[default]
    Local,
    Utc,
}

/// Logging configuration, built with chained setters
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Force `debug` for the svcctl crates, ignoring `RUST_LOG`
    pub debug: bool,
    /// Level of the svcctl crates when `RUST_LOG` is unset
    pub default_level: String,
    pub output: LogOutput,
    /// Show the module path of each event
    pub show_target: bool,
    pub timestamp_format: TimestampFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_level: "info".to_string(),
            output: LogOutput::default(),
            show_target: false,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn utc(self) -> Self {
        self.timestamp_format(TimestampFormat::Utc)
    }

    /// The `svcctl` binary: stderr, `--debug` shows targets
    pub fn cli(debug: bool) -> Self {
        Self::new()
            .debug(debug)
            .show_target(debug)
            .output(LogOutput::Stderr)
    }

    /// Everything svcctl emits, down to `debug`
    pub fn test() -> Self {
        Self::new().default_level("debug")
    }

    /// Filter directives: `warn` globally, the svcctl level for svcctl crates
    fn directives(&self) -> String {
        let level = if self.debug {
            "debug"
        } else {
            self.default_level.as_str()
        };
        std::iter::once(OTHER_TARGETS_LEVEL.to_string())
            .chain(SVCCTL_TARGETS.iter().map(|t| format!("{}={}", t, level)))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn build_filter(&self) -> EnvFilter {
        if self.debug {
            return EnvFilter::new(self.directives());
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed.
///
/// `RUST_LOG` (e.g. `RUST_LOG=svcctl_core=trace`) replaces the default
/// directives unless `debug` is set.
pub fn try_init(config: LogConfig) -> Result<(), TryInitError> {
    let layer = fmt::layer()
        .with_writer(config.output.writer())
        .with_target(config.show_target)
        .with_ansi(config.output.is_terminal());
    let layer = match config.timestamp_format {
        TimestampFormat::Utc => layer.with_timer(UtcTime::rfc_3339()).boxed(),
        TimestampFormat::Local => layer.with_timer(LocalTime::rfc_3339()).boxed(),
    };

    tracing_subscriber::registry()
        .with(config.build_filter())
        .with(layer)
        .try_init()
}

/// Install the global subscriber once at startup
///
/// A second call keeps the first subscriber and reports the conflict on
/// stderr.
pub fn init(config: LogConfig) {
    if let Err(e) = try_init(config) {
        eprintln!("svcctl: logging already initialized: {}", e);
    }
}

/// Logging for tests, captured by the test harness
///
/// Safe to call from every test.
pub fn init_test() {
    let config = LogConfig::test();
    let _ = tracing_subscriber::registry()
        .with(config.build_filter())
        .with(fmt::layer().with_test_writer())
        .try_init();
}
