//! Start, stop and restart commands

use crate::cli::Target;
use crate::context::CliContext;
use crate::output::{ActionRow, Formatter, OutputFormat};
use anyhow::{bail, Context, Result};
use svcctl_core::{Action, InstanceId};

/// Run a lifecycle action against one instance or all of them
pub async fn run(
    ctx: &CliContext,
    action: Action,
    target: Target,
    formatter: &Formatter,
) -> Result<()> {
    match target {
        Target::One { kind, name } => run_one(ctx, action, &kind, &name, formatter).await,
        Target::All => run_all(ctx, action, formatter).await,
    }
}

async fn run_one(
    ctx: &CliContext,
    action: Action,
    kind: &str,
    name: &str,
    formatter: &Formatter,
) -> Result<()> {
    let id = InstanceId::new(kind, name);
    let result = ctx.controller.run(action, kind, name).await;
    let row = ActionRow::new(&id, action, result.as_ref());

    match result {
        Ok(_) => {
            formatter.print_action(&row);
            Ok(())
        }
        Err(e) => {
            if formatter.format == OutputFormat::Json {
                formatter.print_action(&row);
            }
            Err(e).with_context(|| format!("Failed to {} {}", action, id))
        }
    }
}

async fn run_all(ctx: &CliContext, action: Action, formatter: &Formatter) -> Result<()> {
    let report = ctx
        .controller
        .run_bulk(action)
        .await
        .with_context(|| format!("Failed to {} all instances", action))?;

    let rows: Vec<ActionRow> = report
        .entries
        .iter()
        .map(|entry| ActionRow::from_entry(entry, action))
        .collect();
    formatter.print_actions(&rows);

    let failed = report.failures().count();
    if failed > 0 {
        bail!(
            "{} of {} instances failed to {}",
            failed,
            report.entries.len(),
            action
        );
    }
    Ok(())
}
