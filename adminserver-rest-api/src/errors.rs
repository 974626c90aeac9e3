//! REST API error type and its HTTP rendering

use adminserver_config::ConfigError;
use adminserver_web::WebError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::capacity::CapacityError;

/// REST API specific error type
#[derive(Error, Debug)]
pub enum RestError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Capacity probe failed: {0}")]
    Capacity(#[from] CapacityError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RestError::Unauthorized => StatusCode::UNAUTHORIZED,
            RestError::Config(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            RestError::Config(_) | RestError::Capacity(_) | RestError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RestError::BadRequest(_) => "BAD_REQUEST",
            RestError::Unauthorized => "UNAUTHORIZED",
            RestError::Config(e) => e.error_code(),
            RestError::Capacity(_) => "CAPACITY_ERROR",
            RestError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to hand to a client
    fn public_message(&self) -> String {
        match self {
            RestError::Config(ConfigError::Driver(e)) => e.user_message().to_string(),
            RestError::Config(ConfigError::Env(_) | ConfigError::Domain { .. })
            | RestError::InternalError(_) => "Internal server error".to_string(),
            RestError::Config(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<WebError> for RestError {
    fn from(err: WebError) -> Self {
        match err {
            WebError::BadRequest { message } => RestError::BadRequest(message),
            WebError::Unauthorized => RestError::Unauthorized,
            other => RestError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::UNAUTHORIZED {
            return status.into_response();
        }

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.public_message(),
                "status": status.as_u16()
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminserver_storage::StorageError;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RestError::bad_request("not a JSON object").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RestError::from(ConfigError::InvalidType {
                key: "ldap_timeout".to_string(),
                reason: "not an integer".to_string(),
            })
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RestError::from(ConfigError::Timeout {
                operation: "load",
                after: Duration::from_secs(30),
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RestError::from(WebError::Unauthorized).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_driver_details_are_not_exposed() {
        let err = RestError::from(ConfigError::Driver(StorageError::ConnectionFailed(
            "postgres://registry:pw@db".to_string(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "CONNECTION_ERROR");
        assert_eq!(body["error"]["status"], 500);
        assert!(!body.to_string().contains("pw@db"));
    }
}
