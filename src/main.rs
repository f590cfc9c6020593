use std::process::ExitCode;

use clap::Parser;
use sendnotify::cli::executor::{
    CommandResult, EXIT_SUCCESS, error_exit_code, outcome_exit_code, report_outcome,
};
use sendnotify::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};
use sendnotify::{AppError, AppResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            match &e {
                AppError::Internal { source } => eprintln!("Error: {:#}", source),
                other => eprintln!("Error: {}", other),
            }
            ExitCode::from(error_exit_code(&e))
        }
    }
}

async fn run(cli: &Cli) -> AppResult<u8> {
    let settings = load_and_merge_config(cli)?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(version = sendnotify::pkg_version(), "sendnotify starting");

    match execute_command(cli, settings).await? {
        CommandResult::DryRun => Ok(EXIT_SUCCESS),
        CommandResult::Sent(outcome) => {
            let status = outcome.status();
            tracing::info!(
                %status,
                sent = outcome.sent_count(),
                skipped = outcome.skipped_count(),
                failed = outcome.failed_count(),
                "Send finished"
            );
            report_outcome(&outcome);
            Ok(outcome_exit_code(status))
        }
    }
}
