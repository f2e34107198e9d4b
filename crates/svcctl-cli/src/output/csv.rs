//! CSV output for monitoring agents

use super::rows::{format_epoch, format_megabytes, StatusRow, ToolkitReport, ToolkitRow};
use std::fmt::Display;

const TOOLKIT_HEADERS: [&str; 12] = [
    "instance",
    "status",
    "port",
    "type",
    "name",
    "start_time",
    "uptime_hours",
    "pid",
    "threads",
    "dir_size",
    "data_size",
    "cmdline",
];

/// Quote a field when it holds a separator, a quote or a line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn opt<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Headline lines, then a header and one line per instance
pub fn render_toolkit(report: &ToolkitReport, use_utc: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<!>archived_logs,{}\n",
        opt(report.archived_logs.map(format_megabytes))
    ));
    out.push_str(&format!(
        "<!>services_home,{}\n",
        report.services_home.display()
    ));

    out.push_str(&line(&TOOLKIT_HEADERS));
    out.push('\n');
    for row in &report.instances {
        out.push_str(&line(&toolkit_fields(row, use_utc)));
        out.push('\n');
    }
    out
}

fn toolkit_fields(row: &ToolkitRow, use_utc: bool) -> [String; 12] {
    [
        row.instance.clone(),
        row.status.to_string(),
        row.port.clone().unwrap_or_default(),
        row.kind.clone(),
        row.name.clone(),
        opt(row.start_time.map(|t| format_epoch(t, use_utc))),
        opt(row.uptime_hours),
        opt(row.pid),
        opt(row.threads),
        opt(row.dir_size.map(format_megabytes)),
        opt(row.data_size.map(format_megabytes)),
        row.cmdline.clone(),
    ]
}

pub fn render_status(rows: &[StatusRow]) -> String {
    let mut out = line(&["type", "name", "enabled", "state", "pid", "errors"]);
    out.push('\n');
    for row in rows {
        let enabled = if row.enabled { "Y" } else { "N" };
        out.push_str(&line(&[
            row.kind.clone(),
            row.name.clone(),
            enabled.to_string(),
            row.state.to_string(),
            opt(row.pid),
            row.errors.join("; "),
        ]));
        out.push('\n');
    }
    out
}

pub fn print_toolkit(report: &ToolkitReport, use_utc: bool) {
    print!("{}", render_toolkit(report, use_utc));
}

pub fn print_status(rows: &[StatusRow]) {
    print!("{}", render_status(rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::StateLabel;
    use std::path::PathBuf;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_render_toolkit() {
        let report = ToolkitReport {
            services_home: PathBuf::from("/srv/svc"),
            archived_logs: Some(42_000_000),
            instances: vec![ToolkitRow {
                instance: "netprobe - a1".to_string(),
                status: StateLabel::Down,
                port: Some("7036".to_string()),
                kind: "netprobe".to_string(),
                name: "a1".to_string(),
                start_time: None,
                uptime_hours: None,
                pid: None,
                threads: None,
                dir_size: Some(1_500_000),
                data_size: None,
                cmdline: "/srv/svc/packages/netprobe/active_prod/netprobe.linux_64 -port 7036"
                    .to_string(),
            }],
        };

        let out = render_toolkit(&report, true);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "<!>archived_logs,42 MB");
        assert_eq!(lines[1], "<!>services_home,/srv/svc");
        assert_eq!(lines[2], TOOLKIT_HEADERS.join(","));
        assert_eq!(
            lines[3],
            "netprobe - a1,DOWN,7036,netprobe,a1,,,,,1 MB,,/srv/svc/packages/netprobe/active_prod/netprobe.linux_64 -port 7036"
        );
    }

    #[test]
    fn test_missing_archive_is_blank() {
        let report = ToolkitReport {
            services_home: PathBuf::from("/srv/svc"),
            archived_logs: None,
            instances: Vec::new(),
        };
        let out = render_toolkit(&report, true);
        assert!(out.starts_with("<!>archived_logs,\n"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_render_status_quotes_errors() {
        let rows = vec![StatusRow {
            kind: "netprobe".to_string(),
            name: "a1".to_string(),
            enabled: true,
            state: StateLabel::Down,
            pid: None,
            errors: vec!["Invalid config".to_string(), "2 matching processes".to_string()],
        }];
        let out = render_status(&rows);
        assert_eq!(
            out.lines().nth(1),
            Some("netprobe,a1,Y,DOWN,,Invalid config; 2 matching processes")
        );
    }
}
