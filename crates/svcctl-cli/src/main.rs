//! svcctl - local service instance supervisor

use clap::Parser;
use std::process::ExitCode;
use svcctl_cli::cli::Cli;
use svcctl_logging::{error, init, LogConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::cli(cli.debug);
    if cli.utc {
        log_config = log_config.utc();
    }
    init(log_config);

    match svcctl_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
