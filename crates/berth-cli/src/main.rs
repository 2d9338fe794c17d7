mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::cli::parse_args;
use crate::commands::{EXIT_FAILURE, exit_code};
use crate::config::{CliConfig, LOG_ENV};

fn main() -> ExitCode {
    init_logging();

    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = CliConfig::from_env();
    let mut stdout = std::io::stdout().lock();
    let result = commands::run(&config, &cli.command, &mut stdout);

    if let Err(error) = &result {
        tracing::debug!(error = ?error, "command failed");
        eprintln!("berth: {error:#}");
    }
    ExitCode::from(exit_code(&result))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
