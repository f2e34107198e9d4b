//! Presentation rows derived from instance snapshots
//!
//! Rows hold raw values; each renderer decides how to spell them.

use chrono::{Local, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use svcctl_core::{
    Action, BulkEntry, Instance, InstanceId, LifecycleError, Outcome, ResourceUsage,
};

const BYTES_PER_MB: u64 = 1_000_000;
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Coarse state shown to operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateLabel {
    Up,
    Down,
    Disabled,
}

impl StateLabel {
    /// A running instance is UP even when disabled
    pub fn of(instance: &Instance) -> Self {
        if instance.state.up {
            StateLabel::Up
        } else if instance.state.enabled {
            StateLabel::Down
        } else {
            StateLabel::Disabled
        }
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StateLabel::Up => "UP",
            StateLabel::Down => "DOWN",
            StateLabel::Disabled => "DISABLED",
        })
    }
}

/// One line of the `status` summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub enabled: bool,
    pub state: StateLabel,
    pub pid: Option<u32>,
    pub errors: Vec<String>,
}

impl StatusRow {
    pub fn from_instance(instance: &Instance) -> Self {
        let mut errors = Vec::new();
        if instance.errors.config.is_some() {
            errors.push("Invalid config".to_string());
        }
        if instance.state.match_count > 1 {
            errors.push(format!(
                "{} matching processes",
                instance.state.match_count
            ));
        }

        Self {
            kind: instance.id.kind.clone(),
            name: instance.id.name.clone(),
            enabled: instance.state.enabled,
            state: StateLabel::of(instance),
            pid: instance.state.pid,
            errors,
        }
    }
}

/// `status <type> <name>` detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub path: PathBuf,
    pub enabled: bool,
    pub state: StateLabel,
    pub pid: Option<u32>,
    pub match_count: usize,
    pub rc: BTreeMap<String, String>,
    pub usage: ResourceUsage,
    pub error: Option<String>,
}

impl InstanceDetail {
    pub fn from_instance(instance: &Instance, usage: &ResourceUsage) -> Self {
        let error = instance
            .errors
            .config
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| instance.errors.enabled.as_ref().map(ToString::to_string));

        Self {
            kind: instance.id.kind.clone(),
            name: instance.id.name.clone(),
            path: instance.workdir.clone(),
            enabled: instance.state.enabled,
            state: StateLabel::of(instance),
            pid: instance.state.pid,
            match_count: instance.state.match_count,
            rc: instance
                .config
                .rc
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            usage: usage.clone(),
            error,
        }
    }
}

/// One instance line of the `toolkit` report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolkitRow {
    pub instance: String,
    pub status: StateLabel,
    pub port: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub start_time: Option<u64>,
    pub uptime_hours: Option<u64>,
    pub pid: Option<u32>,
    pub threads: Option<usize>,
    pub dir_size: Option<u64>,
    pub data_size: Option<u64>,
    pub cmdline: String,
}

impl ToolkitRow {
    pub fn new(instance: &Instance, usage: &ResourceUsage) -> Self {
        Self {
            instance: format!("{} - {}", instance.id.kind, instance.id.name),
            status: StateLabel::of(instance),
            port: listen_port(instance),
            kind: instance.id.kind.clone(),
            name: instance.id.name.clone(),
            start_time: usage.start_time,
            uptime_hours: usage.uptime_hours,
            pid: instance.state.pid,
            threads: usage.threads,
            dir_size: usage.workdir_bytes,
            data_size: usage.data_bytes,
            cmdline: instance.config.startup_args.join(" "),
        }
    }
}

/// Whole `toolkit` report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolkitReport {
    pub services_home: PathBuf,
    pub archived_logs: Option<u64>,
    pub instances: Vec<ToolkitRow>,
}

/// Result of one lifecycle action on one instance
#[derive(Debug, Clone, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub action: Action,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionRow {
    pub fn new(
        id: &InstanceId,
        action: Action,
        result: Result<&Outcome, &LifecycleError>,
    ) -> Self {
        let (outcome, error) = match result {
            Ok(outcome) => (Some(*outcome), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            kind: id.kind.clone(),
            name: id.name.clone(),
            action,
            ok: error.is_none(),
            outcome,
            error,
        }
    }

    pub fn from_entry(entry: &BulkEntry, action: Action) -> Self {
        Self::new(&entry.id, action, entry.result.as_ref())
    }

    /// `started with pid=42`, or the error message
    pub fn message(&self) -> String {
        match (&self.outcome, &self.error) {
            (Some(outcome), _) => outcome.to_string(),
            (None, Some(error)) => error.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Value of the first mandatory variable named `*_PORT`
pub fn listen_port(instance: &Instance) -> Option<String> {
    instance
        .config
        .mandatory_vars
        .iter()
        .find(|var| var.ends_with("_PORT"))
        .and_then(|var| instance.config.rc.get(var))
        .map(str::to_string)
}

/// Decimal megabytes, rounded down (`"12 MB"`)
pub fn format_megabytes(bytes: u64) -> String {
    format!("{} MB", bytes / BYTES_PER_MB)
}

/// Epoch seconds as `YYYY-MM-DD HH:MM:SS`
pub fn format_epoch(secs: u64, use_utc: bool) -> String {
    let Ok(secs) = i64::try_from(secs) else {
        return secs.to_string();
    };
    match Utc.timestamp_opt(secs, 0).single() {
        Some(dt) if use_utc => dt.format(DATETIME_FORMAT).to_string(),
        Some(dt) => dt.with_timezone(&Local).format(DATETIME_FORMAT).to_string(),
        None => secs.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcctl_core::{InstanceId, RcError};

    fn instance(enabled: bool, pid: Option<u32>) -> Instance {
        let mut instance = Instance::construct(
            std::path::Path::new("/nonexistent"),
            InstanceId::new("netprobe", "a1"),
        );
        instance.state.exists = true;
        instance.state.enabled = enabled;
        instance.state.up = pid.is_some();
        instance.state.pid = pid;
        instance.state.match_count = usize::from(pid.is_some());
        instance.errors.exists = None;
        instance
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(StateLabel::of(&instance(true, Some(10))), StateLabel::Up);
        assert_eq!(StateLabel::of(&instance(false, Some(10))), StateLabel::Up);
        assert_eq!(StateLabel::of(&instance(true, None)), StateLabel::Down);
        assert_eq!(StateLabel::of(&instance(false, None)), StateLabel::Disabled);
        assert_eq!(StateLabel::Disabled.to_string(), "DISABLED");
    }

    #[test]
    fn test_status_row_errors() {
        let mut broken = instance(true, None);
        broken.errors.config = Some(RcError::MissingVar {
            var: "NETPROBE_LISTEN_PORT".to_string(),
            path: PathBuf::from("/srv/netprobe.rc"),
        });
        broken.state.match_count = 2;

        let row = StatusRow::from_instance(&broken);
        assert_eq!(row.state, StateLabel::Down);
        assert_eq!(row.errors, vec!["Invalid config", "2 matching processes"]);
    }

    #[test]
    fn test_listen_port_uses_first_port_var() {
        let mut a1 = instance(true, None);
        a1.config.mandatory_vars = vec!["NETPROBE_LISTEN_PORT".to_string()];
        assert_eq!(listen_port(&a1), None);

        a1.config.rc = [
            ("INSTANCE_PACKAGE_VERSION", "active_prod"),
            ("NETPROBE_LISTEN_PORT", "7036"),
        ]
        .into_iter()
        .collect();
        assert_eq!(listen_port(&a1).as_deref(), Some("7036"));
    }

    #[test]
    fn test_toolkit_row() {
        let mut a1 = instance(true, Some(4242));
        a1.config.startup_args = ["/srv/netprobe", "-port", "7036"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let usage = ResourceUsage {
            start_time: Some(1_700_000_000),
            uptime_hours: Some(3),
            threads: Some(8),
            memory_bytes: Some(1024),
            workdir_bytes: Some(5_500_000),
            data_bytes: None,
        };

        let row = ToolkitRow::new(&a1, &usage);
        assert_eq!(row.instance, "netprobe - a1");
        assert_eq!(row.status, StateLabel::Up);
        assert_eq!(row.pid, Some(4242));
        assert_eq!(row.cmdline, "/srv/netprobe -port 7036");
        assert_eq!(row.dir_size, Some(5_500_000));
    }

    #[test]
    fn test_instance_detail_carries_usage() {
        let mut a1 = instance(true, Some(4242));
        a1.config.rc = [("NETPROBE_LISTEN_PORT", "7036")].into_iter().collect();
        let usage = ResourceUsage {
            memory_bytes: Some(48_000_000),
            threads: Some(6),
            ..ResourceUsage::default()
        };

        let detail = InstanceDetail::from_instance(&a1, &usage);
        assert_eq!(detail.state, StateLabel::Up);
        assert_eq!(detail.rc["NETPROBE_LISTEN_PORT"], "7036");
        assert_eq!(detail.usage.memory_bytes, Some(48_000_000));

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["type"], "netprobe");
        assert_eq!(json["usage"]["memory_bytes"], 48_000_000);
        assert_eq!(json["usage"]["threads"], 6);
        assert!(json["usage"]["data_bytes"].is_null());
    }

    #[test]
    fn test_action_row_messages() {
        let id = InstanceId::new("netprobe", "a1");
        let ok = Outcome::Start(svcctl_core::StartOutcome::Started { pid: 42 });
        let row = ActionRow::new(&id, Action::Start, Ok(&ok));
        assert!(row.ok);
        assert_eq!(row.message(), "started with pid=42");

        let err = LifecycleError::UnsupportedKind {
            kind: "postgres".to_string(),
        };
        let row = ActionRow::new(&id, Action::Stop, Err(&err));
        assert!(!row.ok);
        assert_eq!(row.message(), "Unsupported instance type 'postgres'");
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["action"], "stop");
        assert!(json.get("outcome").is_none());
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0 MB");
        assert_eq!(format_megabytes(999_999), "0 MB");
        assert_eq!(format_megabytes(12_345_678), "12 MB");
    }

    #[test]
    fn test_format_epoch_utc() {
        assert_eq!(format_epoch(0, true), "1970-01-01 00:00:00");
        assert_eq!(format_epoch(1_700_000_000, true), "2023-11-14 22:13:20");
        assert_eq!(format_epoch(u64::MAX, true), u64::MAX.to_string());
    }
}
