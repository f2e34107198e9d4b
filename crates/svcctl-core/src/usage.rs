//! Resource usage of an instance, for monitoring reports

use crate::instance::Instance;
use crate::ports::ProcessTable;
use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use svcctl_config::paths;

const SECS_PER_HOUR: u64 = 3600;

/// Read-only usage figures of one instance
///
/// Process figures are only present while the instance is up. Directory
/// sizes are `None` when the directory cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceUsage {
    /// Process start time, seconds since the Unix epoch
    pub start_time: Option<u64>,
    /// Whole hours since the process started
    pub uptime_hours: Option<u64>,
    pub threads: Option<usize>,
    pub memory_bytes: Option<u64>,
    /// Total size of the workdir
    pub workdir_bytes: Option<u64>,
    /// Total size of `<workdir>/data/`, following a `data` symlink
    pub data_bytes: Option<u64>,
}

impl ResourceUsage {
    pub fn collect(instance: &Instance, table: &dyn ProcessTable) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::collect_at(instance, table, now)
    }

    /// Same as [`collect`](Self::collect) with an explicit current time
    pub fn collect_at(instance: &Instance, table: &dyn ProcessTable, now: u64) -> Self {
        let mut usage = Self {
            workdir_bytes: dir_size(&instance.workdir).ok(),
            data_bytes: dir_size(&paths::data_dir(&instance.workdir)).ok(),
            ..Self::default()
        };

        if let Some(stats) = instance.state.pid.and_then(|pid| table.stats(pid)) {
            usage.start_time = Some(stats.start_time);
            usage.uptime_hours = Some(now.saturating_sub(stats.start_time) / SECS_PER_HOUR);
            usage.threads = stats.threads;
            usage.memory_bytes = Some(stats.memory_bytes);
        }
        usage
    }
}

/// Recursive size of the regular files under `path`
///
/// `path` itself may be a symlink to a directory. Symlinks below it are not
/// followed.
pub fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_file() {
            size += entry.metadata()?.len();
        } else if file_type.is_dir() {
            size += dir_size(&entry.path())?;
        }
    }
    Ok(size)
}
