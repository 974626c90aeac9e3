//! Configuration error types

use adminserver_core::CoreError;
use adminserver_storage::StorageError;
use std::time::Duration;
use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by the configuration manager and the settings loader
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No metadata item is registered under this name
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// The value does not satisfy the item's declared type
    #[error("Invalid value for '{key}': {reason}")]
    InvalidType { key: String, reason: String },

    /// The item is known but holds no value
    #[error("Configuration key not set: {0}")]
    NotSet(String),

    /// The persistence driver failed
    #[error("Driver error: {0}")]
    Driver(#[from] StorageError),

    /// A driver call did not finish within its budget
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The operation is not available for this manager flavor
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    Env(String),

    /// Domain-specific validation error
    #[error("Domain configuration error in {domain}: {message}")]
    Domain { domain: String, message: String },
}

impl From<CoreError> for ConfigError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownKey(key) => ConfigError::UnknownKey(key),
            CoreError::InvalidType { key, reason } => ConfigError::InvalidType { key, reason },
            CoreError::NotSet(key) => ConfigError::NotSet(key),
            CoreError::DuplicateKey(key) => ConfigError::Domain {
                domain: "metadata".to_string(),
                message: format!("duplicate item {}", key),
            },
        }
    }
}

impl ConfigError {
    /// Whether the caller supplied the bad input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConfigError::UnknownKey(_) | ConfigError::InvalidType { .. } | ConfigError::NotSet(_)
        )
    }

    /// Stable machine readable code for the error
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::UnknownKey(_) => "UNKNOWN_KEY",
            ConfigError::InvalidType { .. } => "INVALID_TYPE",
            ConfigError::NotSet(_) => "NOT_SET",
            ConfigError::Driver(e) => e.error_code(),
            ConfigError::Timeout { .. } => "TIMEOUT",
            ConfigError::Unsupported(_) => "UNSUPPORTED",
            ConfigError::Env(_) | ConfigError::Domain { .. } => "CONFIG_ERROR",
        }
    }
}
