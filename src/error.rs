/// Unified error types for the career portal
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the portal
#[derive(Error, Debug)]
pub enum PortalError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Role check failed. Carries no detail on purpose.
    #[error("Access denied")]
    Forbidden,

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness constraint violations (duplicate email or mobile number)
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upload exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Outbound mail errors
    #[error("Mail error: {0}")]
    Mail(String),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Status code and stable error code for this error
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            PortalError::Validation(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
            PortalError::Duplicate(_) => (StatusCode::BAD_REQUEST, "DuplicateRecord"),
            PortalError::Authentication(_) => {
                (StatusCode::UNAUTHORIZED, "AuthenticationRequired")
            }
            PortalError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            PortalError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            PortalError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PayloadTooLarge"),
            PortalError::Database(_)
            | PortalError::Migration(_)
            | PortalError::Mail(_)
            | PortalError::Jwt(_)
            | PortalError::Io(_)
            | PortalError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError")
            }
        }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        self.classify().0
    }

    /// Message safe to show to a client. Server-side failures are not leaked.
    pub fn public_message(&self) -> String {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert PortalError to HTTP response
impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.classify();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message: self.public_message(),
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for PortalError {
    fn from(rejection: JsonRejection) -> Self {
        PortalError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for PortalError {
    fn from(rejection: MultipartRejection) -> Self {
        PortalError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for PortalError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            PortalError::PayloadTooLarge("Upload exceeds the configured limit".to_string())
        } else {
            PortalError::Validation(format!("Malformed multipart body: {}", err.body_text()))
        }
    }
}

impl From<validator::ValidationErrors> for PortalError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PortalError::Validation(crate::validation::describe(&errors))
    }
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniqueness_errors_are_client_errors() {
        let err = PortalError::Duplicate("Email already registered".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.public_message().contains("Email already registered"));
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let err = PortalError::Internal("connection string sqlite:///secret".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");

        let err = PortalError::Mail("SMTP relay refused".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_forbidden_has_no_detail() {
        let err = PortalError::Forbidden;
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), "Access denied");
    }
}
