//! Configuration settings structures for sendnotify
//!
//! This module defines all configuration structures that can be loaded from
//! JSON or TOML files and environment variables.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_path() -> String {
    "logs/sendnotify.log".to_string()
}

fn default_log_format() -> String {
    "full".to_string()
}

fn default_key_prefix() -> String {
    "sendnotification".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_pool_size() -> u32 {
    2
}

fn default_redis_connection_timeout() -> u64 {
    2
}

fn default_memory_max_size() -> usize {
    1000
}

fn default_delivery_timeout() -> u64 {
    5
}

fn default_pushover_api_url() -> String {
    "https://api.pushover.net/1/messages.json".to_string()
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    25
}

fn default_sender() -> String {
    "sendnotify@localhost".to_string()
}

// ============================================================================
// Services
// ============================================================================

/// One configured delivery service
///
/// Mirrors the `{ "title": ..., "settings": { ... } }` entries of the
/// `services` list. `title` names the backend and must match a known adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Backend name, e.g. "pushover" or "email"
    pub title: String,

    /// Backend-specific credentials and defaults
    #[serde(default)]
    pub settings: BTreeMap<String, String>,

    /// Whether the service takes part in sends without an explicit backend
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ServiceEntry {
    pub fn new(title: impl Into<String>, settings: BTreeMap<String, String>) -> Self {
        Self {
            title: title.into(),
            settings,
            enabled: true,
        }
    }
}

// ============================================================================
// Suppression Configuration
// ============================================================================

/// Suppression store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionBackendKind {
    #[default]
    Redis,
    Disk,
    Memory,
    None,
}

/// Redis suppression store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_redis_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            connection_timeout: default_redis_connection_timeout(),
        }
    }
}

/// Disk suppression store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiskStoreConfig {
    /// Directory holding the store; defaults to the user cache directory
    #[serde(default)]
    pub directory: Option<String>,
}

impl DiskStoreConfig {
    /// Resolve the store directory, falling back to `<cache_dir>/sendnotify`
    pub fn resolved_directory(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("sendnotify"),
        }
    }
}

/// In-process suppression store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Maximum number of tracked keys
    #[serde(default = "default_memory_max_size")]
    pub max_size: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_size: default_memory_max_size(),
        }
    }
}

/// Suppression configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionConfig {
    /// Store backend type
    #[serde(default)]
    pub backend: SuppressionBackendKind,

    /// Prefix for every suppression key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Redis store settings
    #[serde(default)]
    pub redis: RedisStoreConfig,

    /// Disk store settings
    #[serde(default)]
    pub disk: DiskStoreConfig,

    /// Memory store settings
    #[serde(default)]
    pub memory: MemoryStoreConfig,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            backend: SuppressionBackendKind::default(),
            key_prefix: default_key_prefix(),
            redis: RedisStoreConfig::default(),
            disk: DiskStoreConfig::default(),
            memory: MemoryStoreConfig::default(),
        }
    }
}

// ============================================================================
// Delivery Configuration
// ============================================================================

/// Pushover endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushoverDeliveryConfig {
    /// Messages API endpoint
    #[serde(default = "default_pushover_api_url")]
    pub api_url: String,
}

impl Default for PushoverDeliveryConfig {
    fn default() -> Self {
        Self {
            api_url: default_pushover_api_url(),
        }
    }
}

/// SMTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDeliveryConfig {
    /// SMTP relay host
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// From address used when no sender is configured or given
    #[serde(default = "default_sender")]
    pub default_sender: String,
}

impl Default for EmailDeliveryConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            default_sender: default_sender(),
        }
    }
}

/// Transport-level delivery configuration shared by all providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Network timeout for a single provider call, in seconds
    #[serde(default = "default_delivery_timeout")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub pushover: PushoverDeliveryConfig,

    #[serde(default)]
    pub email: EmailDeliveryConfig,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_delivery_timeout(),
            pushover: PushoverDeliveryConfig::default(),
            email: EmailDeliveryConfig::default(),
        }
    }
}

// ============================================================================
// Dispatch Configuration
// ============================================================================

/// How a send without an explicit backend walks the enabled services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Attempt every enabled backend
    #[default]
    FanOut,
    /// Stop at the first backend that delivered (or was suppressed)
    Failover,
}

/// Dispatch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DispatchConfig {
    #[serde(default)]
    pub mode: DispatchMode,
}

// ============================================================================
// Logger Settings (compatible with LoggerConfig)
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to LoggerConfig
    ///
    /// This method transforms the configuration file representation into
    /// the runtime LoggerConfig used by the logger module.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = self.console.into_console_config();
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl ConsoleSettings {
    /// Convert ConsoleSettings to ConsoleConfig
    pub fn into_console_config(self) -> ConsoleConfig {
        ConsoleConfig::new(self.enabled, self.colored)
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.parse_format()?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format).map_err(
            |e| ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            },
        )
    }

    /// Parse the format string into LogFormat enum
    fn parse_format(&self) -> Result<LogFormat, ConfigError> {
        self.format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from the configuration file and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Configured delivery services, in dispatch order
    #[serde(default)]
    pub services: Vec<ServiceEntry>,

    /// Suppression store configuration
    #[serde(default)]
    pub suppression: SuppressionConfig,

    /// Provider transport configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Dispatch behaviour
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}
