//! HTTP middleware stack for the portal.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (frontend origin, credentials allowed)
//! 5. Session layer (tower-sessions)
//!
//! Authentication is done by extractors in [`auth`] rather than layers.

pub mod auth;
pub mod cors;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdmin, RequireCustomer, clear_session, set_current_customer};
pub use cors::cors_layer;
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_layer};
