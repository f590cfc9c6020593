//! Command executor for the send command
//!
//! This module turns parsed CLI arguments and merged settings into a
//! notification request, runs it, and maps the result to an exit status.

use std::time::Duration;

use tokio::io::AsyncReadExt;

use super::handlers::SendCommandHandler;
use super::parser::Cli;
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::models::{
    BackendConfig, BackendKind, DeliveryStatus, NotificationRequest, Outcome, OutcomeStatus,
    ResolvedConfig,
};

/// Delivered, suppressed, or dry run
pub const EXIT_SUCCESS: u8 = 0;
/// Bad arguments, empty message, logger or other unexpected failure
pub const EXIT_ERROR: u8 = 1;
/// Missing or invalid configuration
pub const EXIT_CONFIG_ERROR: u8 = 2;
/// Every attempted backend failed
pub const EXIT_ALL_FAILED: u8 = 3;
/// At least one backend delivered and at least one failed
pub const EXIT_PARTIAL_FAILURE: u8 = 4;

/// Result of a successfully executed command
#[derive(Debug)]
pub enum CommandResult {
    /// `--dry-run`: plan printed, nothing sent
    DryRun,
    /// The send ran; individual backends may still have failed
    Sent(Outcome),
}

/// Execute the send command with the given settings
///
/// # Errors
/// Validation errors for the request, configuration errors from preflight
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<CommandResult> {
    let message = read_message(cli).await?;
    let request = build_request(cli, &message)?;
    let resolved = resolve_services(cli, &settings)?;

    let handler = SendCommandHandler::new(settings);

    if cli.dry_run {
        handler.dry_run(&request, &resolved)?;
        return Ok(CommandResult::DryRun);
    }

    let outcome = handler.execute(&request, &resolved).await?;
    Ok(CommandResult::Sent(outcome))
}

/// Message from the positional argument, or all of stdin
async fn read_message(cli: &Cli) -> AppResult<String> {
    if let Some(message) = &cli.message {
        return Ok(message.clone());
    }

    let mut message = String::new();
    tokio::io::stdin()
        .read_to_string(&mut message)
        .await
        .map_err(|e| anyhow::Error::new(e).context("Failed to read message from stdin"))?;
    Ok(message)
}

/// Build the request from CLI arguments
pub fn build_request(cli: &Cli, message: &str) -> AppResult<NotificationRequest> {
    let mut request = NotificationRequest::new(message)?.with_fields(cli.field_overrides());

    if let Some(seconds) = cli.interval {
        request = request.with_interval(Duration::from_secs(seconds));
    }

    if let Some(backend) = &cli.backend {
        request = request.with_backend(backend.clone());
    }

    Ok(request)
}

/// Resolve the configured services
///
/// With `--no-config` the requested backend is configured with no stored
/// settings; every field then has to come from the command line.
pub fn resolve_services(cli: &Cli, settings: &Settings) -> AppResult<ResolvedConfig> {
    if !cli.no_config {
        return ResolvedConfig::from_services(&settings.services);
    }

    let kind: BackendKind = cli
        .backend
        .as_deref()
        .ok_or_else(|| AppError::validation("backend", "--no-config requires --backend"))?
        .parse()?;

    ResolvedConfig::new(
        vec![BackendConfig::new(kind, Default::default())?],
        vec![kind],
    )
}

/// Print per-backend failures to stderr
pub fn report_outcome(outcome: &Outcome) {
    for result in outcome.results() {
        if let DeliveryStatus::Failed { error } = &result.status {
            eprintln!("{}: {}", result.backend, error);
        }
    }
}

/// Exit status for an outcome
pub fn outcome_exit_code(status: OutcomeStatus) -> u8 {
    match status {
        OutcomeStatus::Delivered | OutcomeStatus::Suppressed => EXIT_SUCCESS,
        OutcomeStatus::Failed => EXIT_ALL_FAILED,
        OutcomeStatus::PartialFailure => EXIT_PARTIAL_FAILURE,
    }
}

/// Exit status for an error that stopped the command
pub fn error_exit_code(error: &AppError) -> u8 {
    if error.is_configuration() {
        EXIT_CONFIG_ERROR
    } else {
        EXIT_ERROR
    }
}
