//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client with the standard error envelope. All
//! route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::ErrorEnvelope;
use crate::services::auth::AuthError;
use crate::services::customers::CustomerError;

/// Message returned when an admin update carries a password.
pub const PASSWORD_UPDATE_FORBIDDEN: &str =
    "Password cannot be updated through this route. Use the password change flow.";

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more field constraints failed.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Email already belongs to another customer.
    #[error("Email already registered")]
    DuplicateEmail,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Route exists but not for this HTTP method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CustomerError> for AppError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::Validation(messages) => Self::Validation(messages),
            CustomerError::DuplicateEmail => Self::DuplicateEmail,
            CustomerError::NotFound => Self::NotFound("Customer not found".to_owned()),
            CustomerError::PasswordUpdateForbidden => {
                Self::BadRequest(PASSWORD_UPDATE_FORBIDDEN.to_owned())
            }
            CustomerError::Malformed(msg) => Self::BadRequest(msg),
            CustomerError::Auth(err) => Self::Auth(err),
            CustomerError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateEmail | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unauthorized(_) | Self::Auth(AuthError::InvalidCredentials) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn into_envelope(self) -> ErrorEnvelope {
        match self {
            Self::Validation(messages) => ErrorEnvelope::many(messages),
            Self::DuplicateEmail => ErrorEnvelope::one("Email already registered"),
            Self::MethodNotAllowed => ErrorEnvelope::one("Method not allowed"),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => {
                ErrorEnvelope::one(msg)
            }
            Self::Auth(AuthError::InvalidCredentials) => {
                ErrorEnvelope::one("Invalid email or password")
            }
            // Don't expose internal error details to clients
            Self::Auth(_) | Self::Database(_) | Self::Internal(_) => {
                ErrorEnvelope::one("Internal server error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.into_envelope())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer ID.
///
/// Call this after successful authentication to associate errors with customers.
pub fn set_sentry_user(customer_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
