//! JSON output formatting

use super::rows::{ActionRow, InstanceDetail, StatusRow, ToolkitReport};
use serde::Serialize;

/// Helper to print any serializable value as JSON
fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}

pub fn print_status(rows: &[StatusRow]) {
    print_json(&rows);
}

pub fn print_detail(detail: &InstanceDetail) {
    print_json(detail);
}

pub fn print_toolkit(report: &ToolkitReport) {
    print_json(report);
}

pub fn print_action(row: &ActionRow) {
    print_json(row);
}

pub fn print_actions(rows: &[ActionRow]) {
    print_json(&rows);
}
