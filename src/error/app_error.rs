use thiserror::Error;

use crate::config::error::ConfigError;

/// Application-wide error type that represents all possible errors in the system.
///
/// Configuration errors abort a send before any network call is made.
/// Delivery errors are recorded per backend in the dispatch outcome and only
/// surface as `AppError` from the providers themselves.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error: missing or unknown setting, unknown backend, etc.
    #[error("Configuration error: {key} - {message}")]
    Configuration { key: String, message: String },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Delivery error raised by a backend provider
    #[error("Delivery via {backend} failed: {message}")]
    Delivery { backend: String, message: String },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Create a configuration error for the given key
    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a validation error for the given field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a delivery error for the given backend
    pub fn delivery(backend: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Delivery {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration { .. })
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::ValidationError { field, message } => AppError::Configuration {
                key: field,
                message,
            },
            other => AppError::Configuration {
                key: "config".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation_error_keeps_field() {
        let err: AppError = ConfigError::validation("services", "at least one is needed").into();
        match err {
            AppError::Configuration { key, message } => {
                assert_eq!(key, "services");
                assert_eq!(message, "at least one is needed");
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_other_config_errors_map_to_configuration() {
        let err: AppError = ConfigError::file_not_found("/nope.json").into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("/nope.json"));
    }

    #[test]
    fn test_delivery_error_display() {
        let err = AppError::delivery("pushover", "HTTP 400: invalid token");
        assert_eq!(
            err.to_string(),
            "Delivery via pushover failed: HTTP 400: invalid token"
        );
        assert!(!err.is_configuration());
    }
}
