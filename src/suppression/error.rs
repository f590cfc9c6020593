//! Suppression store error types.

use thiserror::Error;

/// Errors that can occur while talking to a suppression store.
///
/// None of these abort a send; the store front logs them and fails open.
#[derive(Error, Debug)]
pub enum SuppressionError {
    #[error("Suppression store operation failed: {0}")]
    Operation(String),

    #[error("Suppression store connection failed: {0}")]
    Connection(String),
}
