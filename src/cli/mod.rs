//! CLI module for sendnotify
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config file)
//! - Command execution and exit status mapping

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

// Re-export public types for convenience
pub use config_merger::ConfigurationMerger;
pub use executor::{CommandResult, execute_command};
pub use parser::{Cli, LogLevel, Mode};

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::logger::init_logger;

/// Load and merge configuration from CLI arguments
///
/// 1. Load base configuration from the file (unless `--no-config`)
/// 2. Merge CLI argument overrides
/// 3. Validate the final configuration
///
/// # Errors
/// `AppError::Configuration` if loading, merging or validation fails
pub fn load_and_merge_config(cli: &Cli) -> AppResult<Settings> {
    let merger = ConfigurationMerger::from_cli(cli)?;
    Ok(merger.merge_cli_args(cli)?)
}

/// Initialize logger from settings
///
/// # Errors
/// Returns error if the logger configuration is invalid or a global
/// subscriber is already installed
pub fn init_logger_from_settings(settings: &Settings) -> AppResult<()> {
    let logger_config = settings.logger.clone().into_logger_config()?;
    init_logger(logger_config)?;
    Ok(())
}
