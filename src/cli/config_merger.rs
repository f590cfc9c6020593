//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use super::parser::Cli;
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Configuration merger that handles CLI argument integration with file-based configuration
///
/// This struct implements the configuration precedence logic where CLI arguments
/// override configuration file values.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Create a configuration merger by loading the configuration the CLI points at
    ///
    /// `--no-config` loads defaults and environment overrides only; otherwise
    /// the file from `--config`, `SENDNOTIFY_CONFIG_FILE` or the default path
    /// is required.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = if cli.no_config {
            ConfigLoader::manual()
        } else {
            ConfigLoader::new(cli.config.as_deref())?
        };

        Ok(Self::new(loader.load()?))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// Precedence, highest first:
    /// 1. `--log-level`, then `--verbose`/`--quiet`; `--mode`
    /// 2. Configuration file and environment values
    ///
    /// # Returns
    /// A new Settings instance with CLI overrides applied
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        self.apply_logging_overrides(&mut config, cli);

        if let Some(mode) = cli.mode {
            config.dispatch.mode = mode.into();
        }

        // Validate the merged configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply logging level overrides from global flags
    fn apply_logging_overrides(&self, config: &mut Settings, cli: &Cli) {
        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        // Explicit level takes precedence over --verbose/--quiet
        if let Some(level) = &cli.log_level {
            config.logger.level = level.clone().into();
        }
    }

    /// Get the current configuration (useful for inspection)
    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parser::Cli;
    use crate::config::DispatchMode;
    use clap::Parser;

    #[test]
    fn test_configuration_merger_new() {
        let base_config = Settings::default();
        let merger = ConfigurationMerger::new(base_config.clone());
        assert_eq!(merger.config(), &base_config);
    }

    #[test]
    fn test_configuration_merger_merge_verbose_flag() {
        let merger = ConfigurationMerger::new(Settings::default());

        let cli = Cli::try_parse_from(["sendnotify", "--verbose", "hi"]).unwrap();
        let merged_config = merger.merge_cli_args(&cli).unwrap();

        assert_eq!(merged_config.logger.level, "debug");
    }

    #[test]
    fn test_configuration_merger_merge_quiet_flag() {
        let merger = ConfigurationMerger::new(Settings::default());

        let cli = Cli::try_parse_from(["sendnotify", "--quiet", "hi"]).unwrap();
        let merged_config = merger.merge_cli_args(&cli).unwrap();

        assert_eq!(merged_config.logger.level, "error");
    }

    #[test]
    fn test_configuration_merger_log_level_overrides_verbose() {
        let merger = ConfigurationMerger::new(Settings::default());

        let cli =
            Cli::try_parse_from(["sendnotify", "--verbose", "--log-level", "warn", "hi"]).unwrap();
        let merged_config = merger.merge_cli_args(&cli).unwrap();

        assert_eq!(merged_config.logger.level, "warn");
    }

    #[test]
    fn test_configuration_merger_mode_override() {
        let merger = ConfigurationMerger::new(Settings::default());

        let cli = Cli::try_parse_from(["sendnotify", "--mode", "failover", "hi"]).unwrap();
        let merged_config = merger.merge_cli_args(&cli).unwrap();

        assert_eq!(merged_config.dispatch.mode, DispatchMode::Failover);
    }

    #[test]
    fn test_configuration_merger_keeps_file_values() {
        let mut base_config = Settings::default();
        base_config.logger.level = "info".to_string();
        let merger = ConfigurationMerger::new(base_config);

        let cli = Cli::try_parse_from(["sendnotify", "hi"]).unwrap();
        let merged_config = merger.merge_cli_args(&cli).unwrap();

        assert_eq!(merged_config.logger.level, "info");
        assert_eq!(merged_config.dispatch.mode, DispatchMode::FanOut);
    }

    #[test]
    fn test_from_cli_no_config() {
        let cli =
            Cli::try_parse_from(["sendnotify", "--no-config", "-b", "pushover", "hi"]).unwrap();
        let merger = ConfigurationMerger::from_cli(&cli).unwrap();
        assert!(merger.config().services.is_empty());
    }
}
