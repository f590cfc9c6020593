//! Configuration management module for sendnotify
//!
//! This module provides configuration loading with support for:
//! - A JSON (or TOML) configuration file, `~/.sendnotification` by default
//! - Environment variable overrides
//! - Manual, file-less setup where services are supplied in memory
//!
//! # Configuration Priority (lowest to highest)
//! 1. Built-in defaults
//! 2. The configuration file
//! 3. `SENDNOTIFY_*` environment variables

pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

// Re-export public types
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    DeliveryConfig, DispatchConfig, DispatchMode, ServiceEntry, Settings, SuppressionBackendKind,
    SuppressionConfig,
};
