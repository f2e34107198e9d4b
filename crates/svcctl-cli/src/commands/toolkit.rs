//! Toolkit command - monitoring report for external agents

use super::status::snapshot_all;
use crate::context::CliContext;
use crate::output::{Formatter, ToolkitReport, ToolkitRow};
use anyhow::Result;
use svcctl_config::paths;
use svcctl_core::{dir_size, ResourceUsage};

/// Run toolkit command
pub async fn run(ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    let table = ctx.inspector().table();
    let instances = snapshot_all(ctx)?
        .iter()
        .map(|instance| {
            let usage = ResourceUsage::collect(instance, table.as_ref());
            ToolkitRow::new(instance, &usage)
        })
        .collect();

    let report = ToolkitReport {
        services_home: ctx.root().to_path_buf(),
        archived_logs: dir_size(&paths::archived_logs_dir(ctx.root())).ok(),
        instances,
    };
    formatter.print_toolkit(&report);
    Ok(())
}
