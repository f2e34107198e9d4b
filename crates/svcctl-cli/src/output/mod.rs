//! Output formatting module for CLI commands
//!
//! Provides unified output formatting with support for:
//! - Table format (default, human-readable)
//! - JSON format (for scripting/automation)
//! - CSV format (monitoring agents; always used by `toolkit` unless JSON)

mod csv;
mod format;
mod json;
mod rows;
mod table;

pub use format::{Formatter, OutputFormat};
pub use rows::{
    format_epoch, format_megabytes, listen_port, ActionRow, InstanceDetail, StateLabel, StatusRow,
    ToolkitReport, ToolkitRow,
};
