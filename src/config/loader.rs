//! Configuration loader for sendnotify
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from the configuration file and environment variables
//! with proper precedence.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for a specific configuration file
pub const CONFIG_FILE_ENV: &str = "SENDNOTIFY_CONFIG_FILE";

/// Default configuration file name, placed in the home directory
const DEFAULT_CONFIG_FILE_NAME: &str = ".sendnotification";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "SENDNOTIFY";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader
///
/// Sources, in order of priority (lowest first):
/// 1. Built-in defaults
/// 2. The configuration file (JSON, or TOML when the file ends in `.toml`)
/// 3. `SENDNOTIFY_*` environment variables
///
/// A loader created with [`ConfigLoader::manual`] skips the file entirely;
/// services are then supplied in memory by the caller.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Configuration file path (None in manual mode)
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader for the given file, `SENDNOTIFY_CONFIG_FILE`, or
    /// `~/.sendnotification`, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is given, the environment variable is unset
    /// and the home directory cannot be determined.
    pub fn new(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = match config_file {
            Some(path) => path.to_path_buf(),
            None => match std::env::var(CONFIG_FILE_ENV) {
                Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
                _ => Self::default_config_path()?,
            },
        };

        Ok(Self {
            config_file: Some(config_file),
        })
    }

    /// Create a loader that reads no configuration file
    pub fn manual() -> Self {
        Self { config_file: None }
    }

    /// Default configuration path: `~/.sendnotification`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// Get the configuration file path, if any
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Load configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration file does not exist
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        // Validate the loaded settings
        settings.validate()?;

        Ok(settings)
    }

    /// Build the config::Config instance from all sources
    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => Self::add_file_source(builder, config_file)?,
            None => builder,
        };

        // Environment variables always win
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    /// Pick the file format from the extension; extensionless dotfiles are JSON
    fn file_format(path: &Path) -> FileFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }

    /// Add the configuration file source to the config builder
    fn add_file_source(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: &Path,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::file_not_found(format!(
                "Unable to open configuration file {}",
                path.display()
            )));
        }

        let path_str = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!("Non UTF-8 configuration path: {}", path.display()))
        })?;

        Ok(builder.add_source(File::new(path_str, Self::file_format(path)).required(true)))
    }

    /// Add environment variable source to the config builder
    ///
    /// Environment variables with prefix `SENDNOTIFY_` are mapped to configuration keys.
    /// Double underscores (`__`) are used as separators for nested keys.
    ///
    /// Examples:
    /// - `SENDNOTIFY_DELIVERY__TIMEOUT_SECONDS` -> `delivery.timeout_seconds`
    /// - `SENDNOTIFY_SUPPRESSION__REDIS__URL` -> `suppression.redis.url`
    fn add_env_source(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}
