//! Error types for format operations

use qbank_core::{MarkupError, ModelError};
use thiserror::Error;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl From<MarkupError> for FormatError {
    fn from(err: MarkupError) -> Self {
        FormatError::ParseError(err.to_string())
    }
}

impl From<ModelError> for FormatError {
    fn from(err: ModelError) -> Self {
        FormatError::SerializationError(err.to_string())
    }
}
