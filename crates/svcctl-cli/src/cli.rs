//! Command-line arguments

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Keyword selecting every discovered instance
pub const ALL: &str = "all";

/// Manage local service instances
#[derive(Debug, Parser)]
#[command(name = "svcctl", version, about, long_about = None)]
pub struct Cli {
    /// Root directory holding `instances/` and `packages/`
    /// (defaults to $SVCCTL_HOME, then SVCCTL_HOME in ~/.svcctl)
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Show timestamps in UTC instead of local time
    #[arg(long, global = true)]
    pub utc: bool,

    /// Disable colored table output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start service instances
    ///
    /// svcctl start <type> <name>
    /// svcctl start all --confirm
    Start(TargetArgs),

    /// Stop service instances
    ///
    /// svcctl stop <type> <name>
    /// svcctl stop all --confirm
    Stop(TargetArgs),

    /// Restart service instances
    ///
    /// svcctl restart <type> <name>
    /// svcctl restart all --confirm
    Restart(TargetArgs),

    /// Show a summary of all instances, or the detail of one
    Status(StatusArgs),

    /// Monitoring report: headlines then one CSV row per instance
    Toolkit,
}

#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Instance type, or `all`
    #[arg(value_name = "TYPE")]
    pub kind: String,

    /// Instance name
    pub name: Option<String>,

    /// Required to act on all instances at once
    #[arg(long)]
    pub confirm: bool,
}

/// What a lifecycle command targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    One { kind: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("--confirm is required when acting on all instances at once")]
    ConfirmationRequired,

    #[error("Missing instance name after type '{kind}'")]
    MissingName { kind: String },

    #[error("'all' does not take an instance name")]
    NameWithAll,
}

impl TargetArgs {
    pub fn target(&self) -> Result<Target, TargetError> {
        match (self.kind.as_str(), &self.name) {
            (ALL, Some(_)) => Err(TargetError::NameWithAll),
            (ALL, None) if !self.confirm => Err(TargetError::ConfirmationRequired),
            (ALL, None) => Ok(Target::All),
            (kind, None) => Err(TargetError::MissingName {
                kind: kind.to_string(),
            }),
            (kind, Some(name)) => Ok(Target::One {
                kind: kind.to_string(),
                name: name.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Instance type (`all` or nothing for the summary)
    #[arg(value_name = "TYPE")]
    pub kind: Option<String>,

    /// Instance name
    pub name: Option<String>,
}

impl StatusArgs {
    /// `Some((kind, name))` for a single-instance detail
    pub fn instance(&self) -> Result<Option<(&str, &str)>, TargetError> {
        match (self.kind.as_deref(), self.name.as_deref()) {
            (None, _) | (Some(ALL), None) => Ok(None),
            (Some(ALL), Some(_)) => Err(TargetError::NameWithAll),
            (Some(kind), None) => Err(TargetError::MissingName {
                kind: kind.to_string(),
            }),
            (Some(kind), Some(name)) => Ok(Some((kind, name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("svcctl").chain(args.iter().copied())).unwrap()
    }

    fn target(args: &[&str]) -> Result<Target, TargetError> {
        match parse(args).command {
            Command::Start(target) | Command::Stop(target) | Command::Restart(target) => {
                target.target()
            }
            other => panic!("not a lifecycle command: {:?}", other),
        }
    }

    #[test]
    fn test_single_instance_target() {
        assert_eq!(
            target(&["start", "netprobe", "a1"]),
            Ok(Target::One {
                kind: "netprobe".to_string(),
                name: "a1".to_string()
            })
        );
    }

    #[test]
    fn test_all_requires_confirm() {
        assert_eq!(
            target(&["stop", "all"]),
            Err(TargetError::ConfirmationRequired)
        );
        assert_eq!(target(&["stop", "all", "--confirm"]), Ok(Target::All));
    }

    #[test]
    fn test_invalid_targets() {
        assert_eq!(target(&["restart", "all", "x"]), Err(TargetError::NameWithAll));
        assert!(matches!(
            target(&["restart", "netprobe"]),
            Err(TargetError::MissingName { .. })
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["status", "--format", "json", "--root", "/srv/svc"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.root, Some(PathBuf::from("/srv/svc")));
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_status_arguments() {
        let summary = StatusArgs {
            kind: None,
            name: None,
        };
        assert_eq!(summary.instance(), Ok(None));

        let all = StatusArgs {
            kind: Some("all".to_string()),
            name: None,
        };
        assert_eq!(all.instance(), Ok(None));

        let one = StatusArgs {
            kind: Some("netprobe".to_string()),
            name: Some("a1".to_string()),
        };
        assert_eq!(one.instance(), Ok(Some(("netprobe", "a1"))));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
