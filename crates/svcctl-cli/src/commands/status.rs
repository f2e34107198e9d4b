//! Status command - Show instance summary or detail

use crate::cli::StatusArgs;
use crate::context::CliContext;
use crate::output::{Formatter, InstanceDetail, StatusRow};
use anyhow::{bail, Context, Result};
use svcctl_core::{discover_all, Instance, InstanceId, ResourceUsage};
use tracing::warn;

/// Run status command
pub async fn run(ctx: &CliContext, args: &StatusArgs, formatter: &Formatter) -> Result<()> {
    match args.instance()? {
        None => {
            let rows: Vec<StatusRow> = snapshot_all(ctx)?
                .iter()
                .map(StatusRow::from_instance)
                .collect();
            formatter.print_status(&rows);
        }
        Some((kind, name)) => {
            let instance = ctx
                .inspector()
                .snapshot(kind, name)
                .with_context(|| format!("Failed to inspect {}", InstanceId::new(kind, name)))?;
            if let Some(e) = &instance.errors.exists {
                bail!("{}: does not exist. {}", instance.id, e);
            }
            let usage = ResourceUsage::collect(&instance, ctx.inspector().table().as_ref());
            formatter.print_detail(&InstanceDetail::from_instance(&instance, &usage));
        }
    }
    Ok(())
}

/// Snapshot every discovered instance, skipping those that cannot be built
pub(crate) fn snapshot_all(ctx: &CliContext) -> Result<Vec<Instance>> {
    let ids = discover_all(ctx.root()).context("Failed to discover instances")?;

    let mut instances = Vec::with_capacity(ids.len());
    for id in ids {
        match ctx.inspector().snapshot(&id.kind, &id.name) {
            Ok(instance) => instances.push(instance),
            Err(e) => warn!(instance = %id, "Skipping: {}", e),
        }
    }
    Ok(instances)
}
