//! CORS for the customer frontend.
//!
//! The frontend is served from its own origin and sends the session cookie
//! with every request, so credentials are allowed for that one origin only.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build the CORS layer for `frontend_origin`.
///
/// An origin that is not a valid header value allows no cross-origin
/// requests at all.
#[must_use]
pub fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(frontend_origin.trim_end_matches('/')) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            tracing::warn!(error = %e, origin = frontend_origin, "Invalid frontend origin, CORS disabled");
            AllowOrigin::list([])
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
