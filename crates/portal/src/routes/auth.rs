//! Authentication route handlers.
//!
//! Login verifies email + password and stores the customer's identity in the
//! server-side session. Logout drops the session entirely.

use axum::extract::State;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_session, set_current_customer};
use crate::models::{CurrentCustomer, Customer};
use crate::response::{ApiJson, ApiResponse, Empty};
use crate::services::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    fn into_credentials(self) -> Result<(String, String)> {
        let email = self.email.filter(|e| !e.trim().is_empty());
        let password = self.password.filter(|p| !p.is_empty());

        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            (email, password) => {
                let mut errors = Vec::new();
                if email.is_none() {
                    errors.push("Email is required".to_string());
                }
                if password.is_none() {
                    errors.push("Password is required".to_string());
                }
                Err(AppError::Validation(errors))
            }
        }
    }
}

/// Handle login.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<ApiResponse<Customer>> {
    let (email, password) = body.into_credentials()?;

    let customer = AuthService::new(state.store())
        .login(&email, &password)
        .await?;

    set_current_customer(&session, &CurrentCustomer::from(&customer)).await?;
    set_sentry_user(&customer.id);

    Ok(ApiResponse::ok(customer))
}

/// Handle logout.
///
/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<ApiResponse<Empty>> {
    clear_session(&session).await?;
    clear_sentry_user();
    Ok(ApiResponse::message("Logged out"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_are_validation_errors() {
        let err = LoginRequest {
            email: Some("  ".to_string()),
            password: None,
        }
        .into_credentials()
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ref msgs) if msgs == &["Email is required", "Password is required"]
        ));
    }

    #[test]
    fn test_present_credentials_pass_through() {
        let creds = LoginRequest {
            email: Some("a@b.com".to_string()),
            password: Some("secret1".to_string()),
        }
        .into_credentials();
        assert!(matches!(creds, Ok((ref e, ref p)) if e == "a@b.com" && p == "secret1"));
    }
}
