//! svcctl command-line interface
//!
//! Argument parsing, the `--confirm` gate for bulk actions, presentation
//! (table, JSON, CSV) and the single place where a failure becomes a
//! non-zero exit status.

pub mod cli;
pub mod commands;
pub mod context;
pub mod output;

use anyhow::Result;
use cli::{Cli, Command, TargetArgs};
use context::CliContext;
use output::Formatter;
use std::path::PathBuf;
use svcctl_core::Action;

/// Run the parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let formatter = Formatter::new(cli.format, cli.no_color, cli.utc);
    let root = cli.root.clone();

    match &cli.command {
        Command::Start(args) => lifecycle(root, Action::Start, args, &formatter).await,
        Command::Stop(args) => lifecycle(root, Action::Stop, args, &formatter).await,
        Command::Restart(args) => lifecycle(root, Action::Restart, args, &formatter).await,
        Command::Status(args) => {
            let ctx = CliContext::new(root)?;
            commands::status::run(&ctx, args, &formatter).await
        }
        Command::Toolkit => {
            let ctx = CliContext::new(root)?;
            commands::toolkit::run(&ctx, &formatter).await
        }
    }
}

/// Target arguments are validated before the root is resolved, so a refused
/// bulk action never touches the filesystem
async fn lifecycle(
    root: Option<PathBuf>,
    action: Action,
    args: &TargetArgs,
    formatter: &Formatter,
) -> Result<()> {
    let target = args.target()?;
    let ctx = CliContext::new(root)?;
    commands::lifecycle::run(&ctx, action, target, formatter).await
}
