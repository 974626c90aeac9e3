//! Storage error types

use crate::encryption::CryptoError;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection-related errors
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution errors
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction errors
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Migration errors
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Encryption failures while persisting a value
    #[error("Encryption error: {0}")]
    Crypto(#[from] CryptoError),

    /// The remote admin server failed or refused the request
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Generic storage errors
    #[error("Storage error: {0}")]
    Other(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::ConnectionFailed(_)
                | StorageError::TransactionFailed(_)
                | StorageError::Remote(_)
        )
    }

    /// Get a user-friendly error message that doesn't expose internal details
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::ConnectionFailed(_) => "Configuration storage unavailable",
            StorageError::QueryFailed(_) => "Configuration storage operation failed",
            StorageError::TransactionFailed(_) => "Transaction could not be completed",
            StorageError::Remote(_) => "Remote configuration service failed",
            StorageError::ConfigError(_) => "Configuration error",
            _ => "An error occurred",
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::ConnectionFailed(_) => "CONNECTION_ERROR",
            StorageError::QueryFailed(_) => "QUERY_ERROR",
            StorageError::TransactionFailed(_) => "TRANSACTION_ERROR",
            StorageError::MigrationFailed(_) => "MIGRATION_ERROR",
            StorageError::ConfigError(_) => "CONFIG_ERROR",
            StorageError::Crypto(_) => "ENCRYPTION_ERROR",
            StorageError::Remote(_) => "REMOTE_ERROR",
            _ => "STORAGE_ERROR",
        }
    }
}

impl From<sea_orm::DbErr> for StorageError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(e) => StorageError::ConnectionFailed(e.to_string()),
            sea_orm::DbErr::ConnectionAcquire(e) => StorageError::ConnectionFailed(e.to_string()),
            sea_orm::DbErr::Migration(msg) => StorageError::MigrationFailed(msg),
            other => StorageError::QueryFailed(other.to_string()),
        }
    }
}

impl From<adminserver_http::HttpError> for StorageError {
    fn from(err: adminserver_http::HttpError) -> Self {
        StorageError::Remote(err.to_string())
    }
}
