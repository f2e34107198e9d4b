//! Core output formatting types and Formatter implementation

use super::rows::{ActionRow, InstanceDetail, StatusRow, ToolkitReport};

/// Output format for CLI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format (default)
    #[default]
    Table,
    /// JSON format for scripting
    Json,
    /// Comma-separated values
    Csv,
}

/// Unified formatter for CLI output
#[derive(Clone, Debug)]
pub struct Formatter {
    pub format: OutputFormat,
    pub no_color: bool,
    pub use_utc: bool,
}

impl Formatter {
    /// Create a new formatter with the given settings
    pub fn new(format: OutputFormat, no_color: bool, use_utc: bool) -> Self {
        Self {
            format,
            no_color,
            use_utc,
        }
    }

    /// Print the instance summary
    pub fn print_status(&self, rows: &[StatusRow]) {
        match self.format {
            OutputFormat::Table => super::table::print_status(rows, self.no_color),
            OutputFormat::Json => super::json::print_status(rows),
            OutputFormat::Csv => super::csv::print_status(rows),
        }
    }

    /// Print one instance in detail
    pub fn print_detail(&self, detail: &InstanceDetail) {
        match self.format {
            OutputFormat::Json => super::json::print_detail(detail),
            OutputFormat::Table | OutputFormat::Csv => {
                super::table::print_detail(detail, self.no_color, self.use_utc)
            }
        }
    }

    /// Print the monitoring report (CSV unless JSON was asked for)
    pub fn print_toolkit(&self, report: &ToolkitReport) {
        match self.format {
            OutputFormat::Json => super::json::print_toolkit(report),
            OutputFormat::Table | OutputFormat::Csv => {
                super::csv::print_toolkit(report, self.use_utc)
            }
        }
    }

    /// Print the result of a single-instance action
    pub fn print_action(&self, row: &ActionRow) {
        match self.format {
            OutputFormat::Json => super::json::print_action(row),
            OutputFormat::Table | OutputFormat::Csv => {
                println!("{} {}: {}", row.kind, row.name, row.message())
            }
        }
    }

    /// Print the per-instance results of a bulk action
    pub fn print_actions(&self, rows: &[ActionRow]) {
        match self.format {
            OutputFormat::Json => super::json::print_actions(rows),
            OutputFormat::Table | OutputFormat::Csv => {
                super::table::print_actions(rows, self.no_color)
            }
        }
    }
}
