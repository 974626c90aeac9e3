//! Error types for the configuration model

use thiserror::Error;

/// Result type for metadata and value operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while resolving or validating configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No metadata item is registered under this name
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// The raw string does not satisfy the item's declared type
    #[error("Invalid value for '{key}': {reason}")]
    InvalidType { key: String, reason: String },

    /// The item is known but has no value in the store
    #[error("Configuration key not set: {0}")]
    NotSet(String),

    /// Two metadata items share a name
    #[error("Duplicate metadata item: {0}")]
    DuplicateKey(String),
}

impl CoreError {
    pub fn invalid_type(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidType {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine readable code for the error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKey(_) => "UNKNOWN_KEY",
            Self::InvalidType { .. } => "INVALID_TYPE",
            Self::NotSet(_) => "NOT_SET",
            Self::DuplicateKey(_) => "DUPLICATE_KEY",
        }
    }
}
