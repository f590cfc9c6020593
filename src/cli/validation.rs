//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

use crate::models::BackendKind;

/// Validate the suppression interval in whole seconds (0 disables suppression)
pub fn validate_interval(interval_str: &str) -> Result<u64, String> {
    interval_str.trim().parse::<u64>().map_err(|_| {
        format!(
            "Interval must be a whole number of seconds, got: '{}'",
            interval_str
        )
    })
}

/// Validate a backend name against the supported backends
pub fn validate_backend_name(name_str: &str) -> Result<String, String> {
    let name = name_str.trim().to_lowercase();

    if BackendKind::ALL.iter().any(|kind| kind.as_str() == name) {
        Ok(name)
    } else {
        Err(format!(
            "Invalid service '{}'. Valid services are: email, pushover",
            name_str
        ))
    }
}

/// Validate a `KEY=VALUE` field override
///
/// The key must belong to at least one backend's field set.
pub fn validate_field(field_str: &str) -> Result<(String, String), String> {
    let (key, value) = field_str
        .split_once('=')
        .ok_or_else(|| format!("Field must be KEY=VALUE, got: '{}'", field_str))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Field name cannot be empty in '{}'", field_str));
    }

    if !BackendKind::ALL.iter().any(|kind| kind.is_known_field(key)) {
        return Err(format!(
            "Unknown field '{}'. Known fields are: api_key, app_token, title, to, subject, sender",
            key
        ));
    }

    Ok((key.to_string(), value.to_string()))
}

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    // Check if file exists
    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    // Check if it's a file (not a directory)
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    // Check if file is readable
    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}
