//! HTTP route handlers for the portal API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Readiness check (store ping)
//!
//! # Auth
//! POST   /api/auth/login                  - Email + password login (starts session)
//! POST   /api/auth/logout                 - Drop the session
//!
//! # Customer self-service
//! POST   /api/customers/register          - Create an account
//! GET    /api/customers/profile           - Own profile (session)
//! PUT    /api/customers/profile           - Update own profile (session)
//! PUT    /api/customers/profile/password  - Change own password (session)
//!
//! # Admin (bearer token)
//! GET    /api/customers                   - List customers
//! GET    /api/customers/{id}              - Customer detail
//! PUT    /api/customers/{id}              - Update customer
//! DELETE /api/customers/{id}              - Delete customer
//! ```

pub mod admin;
pub mod auth;
pub mod customers;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::error::AppError;
use crate::middleware::{cors_layer, request_id_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the customer routes router (self-service and admin).
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::list))
        .route("/register", post(customers::register))
        .route(
            "/profile",
            get(customers::profile).put(customers::update_profile),
        )
        .route("/profile/password", put(customers::change_password))
        .route(
            "/{id}",
            get(admin::show).put(admin::update).delete(admin::destroy),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/customers", customer_routes())
}

/// Build the complete application.
///
/// The session layer is a parameter so the binary can use `PostgreSQL` and
/// tests can use an in-memory store.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let cors = cors_layer(&state.config().frontend_origin);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(session_layer)
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                customer_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the customer store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
