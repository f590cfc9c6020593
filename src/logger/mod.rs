//! Logger Module
//!
//! A logging system based on `tracing-subscriber` with support for:
//! - Console output on stderr with color control
//! - File output with multiple formats (Full, Compact, JSON)

pub mod config;
pub mod error;
pub(crate) mod writer;

// Re-export main types
pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use writer::LogFileWriter;

/// Initialize the global logger with the given configuration
///
/// `RUST_LOG` is ignored; the level comes from the configuration so that
/// `-v`/`-q` behave predictably.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("warn"));

    match (config.console.enabled, config.file.enabled) {
        (true, true) => init_both(&config, filter)?,
        (true, false) => init_console_only(&config.console, filter)?,
        (false, true) => init_file_only(&config.file, filter)?,
        (false, false) => anyhow::bail!("At least one output (console or file) must be enabled"),
    }

    Ok(())
}

fn subscriber_error(e: impl std::fmt::Display) -> LoggerError {
    LoggerError::subscriber(e.to_string())
}

fn init_console_only(config: &ConsoleConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let use_ansi = config.colored && std::io::stderr().is_terminal();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(use_ansi)
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(subscriber_error)
}

fn init_file_only(config: &FileConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let writer = LogFileWriter::new(config)?;

    match config.format {
        LogFormat::Full => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .try_init(),
    }
    .map_err(subscriber_error)
}

fn init_both(config: &LoggerConfig, filter: EnvFilter) -> Result<(), LoggerError> {
    let use_ansi = config.console.colored && std::io::stderr().is_terminal();
    let writer = LogFileWriter::new(&config.file)?;

    // Each arm stacks on a different subscriber type, so the console layer is
    // built per arm. File layer goes first so console ANSI codes do not leak
    // into span fields (https://github.com/tokio-rs/tracing/issues/1817)
    match config.file.format {
        LogFormat::Full => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer),
            )
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .compact()
                    .with_writer(writer),
            )
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).json().with_writer(writer))
            .with(
                fmt::layer()
                    .with_ansi(use_ansi)
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .map_err(subscriber_error)
}
