//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.
//! Per-service settings are checked separately, when they are resolved into
//! backend configurations (see `models::backend`).

use crate::config::error::ConfigError;
use crate::config::settings::{
    DeliveryConfig, FileSettings, LoggerSettings, Settings, SuppressionBackendKind,
    SuppressionConfig,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Accepted Redis URL schemes
const VALID_REDIS_SCHEMES: &[&str] = &["redis://", "rediss://", "unix://", "redis+unix://"];

impl SuppressionConfig {
    /// Validate suppression configuration
    ///
    /// # Validation Rules
    /// - Key prefix must not be empty
    /// - For the redis backend: URL scheme must be recognised, pool size and
    ///   connection timeout must be greater than 0
    /// - For the memory backend: max size must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_prefix.trim().is_empty() {
            return Err(ConfigError::validation(
                "suppression.key_prefix",
                "Key prefix cannot be empty.",
            ));
        }

        match self.backend {
            SuppressionBackendKind::Redis => {
                if !VALID_REDIS_SCHEMES
                    .iter()
                    .any(|scheme| self.redis.url.starts_with(scheme))
                {
                    return Err(ConfigError::ValidationError {
                        field: "suppression.redis.url".to_string(),
                        message: format!(
                            "Invalid Redis URL '{}'. Expected one of: {}",
                            self.redis.url,
                            VALID_REDIS_SCHEMES.join(", ")
                        ),
                    });
                }

                if self.redis.pool_size == 0 {
                    return Err(ConfigError::validation(
                        "suppression.redis.pool_size",
                        "Pool size must be greater than 0.",
                    ));
                }

                if self.redis.connection_timeout == 0 {
                    return Err(ConfigError::validation(
                        "suppression.redis.connection_timeout",
                        "Connection timeout must be greater than 0 seconds.",
                    ));
                }
            }
            SuppressionBackendKind::Memory => {
                if self.memory.max_size == 0 {
                    return Err(ConfigError::validation(
                        "suppression.memory.max_size",
                        "Max size must be greater than 0.",
                    ));
                }
            }
            SuppressionBackendKind::Disk | SuppressionBackendKind::None => {}
        }

        Ok(())
    }
}

impl DeliveryConfig {
    /// Validate delivery configuration
    ///
    /// # Validation Rules
    /// - Timeout must be greater than 0
    /// - Pushover API URL must be http(s)
    /// - SMTP host must not be empty and port must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "delivery.timeout_seconds",
                "Delivery timeout must be greater than 0 seconds.",
            ));
        }

        let api_url = &self.pushover.api_url;
        if !api_url.starts_with("https://") && !api_url.starts_with("http://") {
            return Err(ConfigError::ValidationError {
                field: "delivery.pushover.api_url".to_string(),
                message: format!("Invalid API URL '{}'. Must use http or https.", api_url),
            });
        }

        if self.email.smtp_host.trim().is_empty() {
            return Err(ConfigError::validation(
                "delivery.email.smtp_host",
                "SMTP host cannot be empty.",
            ));
        }

        if self.email.smtp_port == 0 {
            return Err(ConfigError::validation(
                "delivery.email.smtp_port",
                "SMTP port must be between 1 and 65535.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    /// Validate file settings
    fn validate(&self) -> Result<(), ConfigError> {
        // If file logging is enabled, path must not be empty
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        // Validate log format
        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate log level
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        // Validate file settings
        self.file.validate()?;

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered. Services are validated when resolved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.suppression.validate()?;
        self.delivery.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
