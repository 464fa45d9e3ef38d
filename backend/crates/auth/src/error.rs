//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more required request fields are absent or blank
    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Field present but rejected (email format, user name, role, password policy)
    #[error("{0}")]
    Validation(String),

    /// Request body could not be read as JSON
    #[error("{0}")]
    InvalidBody(&'static str),

    /// Unknown identifier or wrong password. One message for both.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No cookie and no bearer header
    #[error("No token provided")]
    NoToken,

    /// Token malformed, badly signed, expired or revoked
    #[error("Invalid token")]
    InvalidToken,

    /// Authenticated, but the role is not allowed on this route
    #[error("Access denied for this role")]
    RoleForbidden,

    #[error("User not found")]
    UserNotFound,

    /// User name or email taken (pre-check or unique index)
    #[error("User name or email already exists")]
    AlreadyRegistered,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored row that does not map onto a user (unknown role code)
    #[error("Unreadable user row: {0}")]
    UnreadableRow(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingFields(_)
            | AuthError::Validation(_)
            | AuthError::InvalidBody(_)
            | AuthError::AlreadyRegistered => ErrorKind::BadRequest,
            AuthError::InvalidCredentials | AuthError::NoToken => ErrorKind::Unauthorized,
            AuthError::InvalidToken | AuthError::RoleForbidden => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Database(e) => match e {
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                    ErrorKind::ServiceUnavailable
                }
                _ => ErrorKind::InternalServerError,
            },
            AuthError::UnreadableRow(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    ///
    /// Database and internal details stay in the `source`; the client only
    /// ever sees the generic message.
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Database(e) => AppError::from(e),
            AuthError::UnreadableRow(msg) | AuthError::Internal(msg) => {
                AppError::internal("Internal server error").with_source(std::io::Error::other(msg))
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::UnreadableRow(msg) | AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RoleForbidden => {
                tracing::warn!("Role not allowed on route");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "Content-Type must be application/json",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::JsonDataError(_) => "Request body has fields of the wrong type",
            _ => "Could not read request body",
        };
        AuthError::InvalidBody(message)
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::MissingFields(vec!["password"]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::NoToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::RoleForbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::AlreadyRegistered.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_missing_fields_message() {
        let err = AuthError::MissingFields(vec!["identifier", "password"]);
        assert_eq!(
            err.to_string(),
            "Missing required field(s): identifier, password"
        );
    }

    #[test]
    fn test_internal_message_not_exposed() {
        let app = AuthError::Internal("argon2 exploded at 0xdeadbeef".to_string()).into_app_error();
        assert_eq!(app.message(), "Internal server error");
        assert!(!app.to_body().to_string().contains("deadbeef"));

        let row = AuthError::UnreadableRow("role 'jefe' for user 7".to_string());
        assert_eq!(row.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(row.into_app_error().message(), "Internal server error");
    }
}
