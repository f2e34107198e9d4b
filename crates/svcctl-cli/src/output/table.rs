//! Table formatting using comfy-table

use super::rows::{
    format_epoch, format_megabytes, ActionRow, InstanceDetail, StateLabel, StatusRow,
};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

/// Create a styled table
fn create_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if no_color {
        table.set_header(headers);
    } else {
        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect();
        table.set_header(header_cells);
    }

    table
}

fn state_cell(state: StateLabel, no_color: bool) -> Cell {
    let cell = Cell::new(state);
    if no_color {
        return cell;
    }
    match state {
        StateLabel::Up => cell.fg(Color::Green),
        StateLabel::Down => cell.fg(Color::Red),
        StateLabel::Disabled => cell.fg(Color::DarkGrey),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Y"
    } else {
        "N"
    }
}

fn pid_text(pid: Option<u32>) -> String {
    pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

pub fn print_status(rows: &[StatusRow], no_color: bool) {
    if rows.is_empty() {
        println!("No instances found");
        return;
    }

    let mut table = create_table(&["Type", "Name", "Enabled", "State", "PID", "Errors"], no_color);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.kind),
            Cell::new(&row.name),
            Cell::new(yes_no(row.enabled)),
            state_cell(row.state, no_color),
            Cell::new(pid_text(row.pid)),
            Cell::new(row.errors.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_detail(detail: &InstanceDetail, no_color: bool, use_utc: bool) {
    let mut table = create_table(&["Field", "Value"], no_color);
    table.add_row(vec![Cell::new("Type"), Cell::new(&detail.kind)]);
    table.add_row(vec![Cell::new("Name"), Cell::new(&detail.name)]);
    table.add_row(vec![
        Cell::new("Path"),
        Cell::new(detail.path.display()),
    ]);
    table.add_row(vec![Cell::new("Enabled"), Cell::new(yes_no(detail.enabled))]);
    table.add_row(vec![Cell::new("State"), state_cell(detail.state, no_color)]);
    table.add_row(vec![Cell::new("PID"), Cell::new(pid_text(detail.pid))]);
    if detail.match_count > 1 {
        table.add_row(vec![
            Cell::new("Matches"),
            Cell::new(detail.match_count),
        ]);
    }
    let usage = &detail.usage;
    table.add_row(vec![
        Cell::new("Started"),
        Cell::new(or_dash(usage.start_time.map(|t| format_epoch(t, use_utc)))),
    ]);
    table.add_row(vec![
        Cell::new("Uptime"),
        Cell::new(or_dash(usage.uptime_hours.map(|h| format!("{} h", h)))),
    ]);
    table.add_row(vec![
        Cell::new("Threads"),
        Cell::new(or_dash(usage.threads.map(|t| t.to_string()))),
    ]);
    table.add_row(vec![
        Cell::new("Memory"),
        Cell::new(or_dash(usage.memory_bytes.map(format_megabytes))),
    ]);
    table.add_row(vec![
        Cell::new("Workdir size"),
        Cell::new(or_dash(usage.workdir_bytes.map(format_megabytes))),
    ]);
    table.add_row(vec![
        Cell::new("Data size"),
        Cell::new(or_dash(usage.data_bytes.map(format_megabytes))),
    ]);
    for (var, value) in &detail.rc {
        table.add_row(vec![Cell::new(var), Cell::new(value)]);
    }
    table.add_row(vec![
        Cell::new("Error"),
        Cell::new(detail.error.as_deref().unwrap_or("-")),
    ]);
    println!("{table}");
}

pub fn print_actions(rows: &[ActionRow], no_color: bool) {
    if rows.is_empty() {
        println!("No instances found");
        return;
    }

    let mut table = create_table(&["Type", "Name", "Action", "Result"], no_color);
    for row in rows {
        let result = Cell::new(row.message());
        let result = match (no_color, row.ok) {
            (true, _) => result,
            (false, true) => result.fg(Color::Green),
            (false, false) => result.fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&row.kind),
            Cell::new(&row.name),
            Cell::new(row.action),
            result,
        ]);
    }
    println!("{table}");
}
