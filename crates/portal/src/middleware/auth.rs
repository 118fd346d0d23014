//! Authentication extractors.
//!
//! - [`RequireCustomer`] - a customer signed in through `/api/auth/login`
//! - [`RequireAdmin`] - a caller presenting the admin bearer token
//!
//! Both reject with a `401` error envelope.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::ExposeSecret;
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentCustomer, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireCustomer(customer): RequireCustomer) -> impl IntoResponse {
///     format!("Hello, {}!", customer.email)
/// }
/// ```
pub struct RequireCustomer(pub CurrentCustomer);

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(not_signed_in)?;

        let customer: CurrentCustomer = session
            .get(session_keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten()
            .ok_or_else(not_signed_in)?;

        set_sentry_user(&customer.id);
        tracing::Span::current().record("customer_id", customer.id.as_i32());

        Ok(Self(customer))
    }
}

fn not_signed_in() -> AppError {
    AppError::Unauthorized("Authentication required".to_string())
}

/// Extractor that requires the admin API token.
///
/// Expects `Authorization: Bearer <PORTAL_ADMIN_API_TOKEN>`.
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim);

        let expected = state.config().admin_api_token.expose_secret();
        match presented {
            Some(token) if constant_time_compare(token, expected) => Ok(Self),
            Some(_) => {
                tracing::warn!(path = %parts.uri.path(), "Rejected admin request: bad token");
                Err(admin_required())
            }
            None => Err(admin_required()),
        }
    }
}

fn admin_required() -> AppError {
    AppError::Unauthorized("Admin authorization required".to_string())
}

/// Store the signed-in customer in the session.
///
/// The session ID is cycled first so a pre-login ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Drop the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Compare two strings in time independent of where they differ.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
