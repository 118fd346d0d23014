//! Test harness for the broker portal API.
//!
//! Builds the real router with the in-memory customer store and the
//! tower-sessions `MemoryStore`, so the tests need no database.
//!
//! - [`TestApp::request`] drives the router in process with `oneshot`.
//! - [`TestApp::spawn`] serves it on an ephemeral port for `reqwest` tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p broker-portal-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use broker_portal::config::PortalConfig;
use broker_portal::db::{CustomerStore, MemoryCustomerStore};
use broker_portal::middleware::session_layer;
use broker_portal::{AppState, app};
use broker_portal_core::CustomerId;

/// Admin bearer token configured for every test app.
pub const ADMIN_TOKEN: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

/// A portal instance backed by in-memory stores.
pub struct TestApp {
    router: Router,
    store: MemoryCustomerStore,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build a fresh app with empty stores.
    #[must_use]
    pub fn new() -> Self {
        let config = PortalConfig::from_lookup(|key| {
            let value = match key {
                "PORTAL_DATABASE_URL" => "postgres://unused/portal",
                "PORTAL_BASE_URL" => "http://localhost:5000",
                "PORTAL_ADMIN_API_TOKEN" => ADMIN_TOKEN,
                _ => return None,
            };
            Some(value.to_string())
        })
        .expect("test configuration is valid");

        let store = MemoryCustomerStore::new();
        let state = AppState::new(config, Arc::new(store.clone()));
        let router = app(state, session_layer(MemoryStore::default(), false));

        Self { router, store }
    }

    /// Start a request against this app.
    #[must_use]
    pub fn request(&self, method: Method, uri: &str) -> TestRequest<'_> {
        TestRequest {
            app: self,
            builder: Request::builder().method(method).uri(uri),
            body: Body::empty(),
        }
    }

    /// Stored password hash, read straight from the store.
    pub async fn password_hash(&self, id: CustomerId) -> Option<String> {
        self.store
            .get_password_hash(id)
            .await
            .expect("memory store does not fail")
    }

    /// Register a customer and return its JSON record.
    pub async fn register(&self, email: &str, password: &str) -> Value {
        let response = self
            .request(Method::POST, "/api/customers/register")
            .json(&serde_json::json!({
                "firstName": "A",
                "lastName": "B",
                "email": email,
                "password": password,
                "address": { "street": "1 Main St", "city": "Springfield", "zipCode": "62701" }
            }))
            .send()
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"].clone()
    }

    /// Log in and return the session cookie (`name=value`).
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(Method::POST, "/api/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.session_cookie.expect("login sets a session cookie")
    }

    /// Serve the app on an ephemeral local port and return its base URL.
    pub async fn spawn(self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener has an address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, self.router).await;
        });

        format!("http://{addr}")
    }
}

/// A request under construction.
pub struct TestRequest<'a> {
    app: &'a TestApp,
    builder: axum::http::request::Builder,
    body: Body,
}

impl TestRequest<'_> {
    /// Send `value` as a JSON body.
    #[must_use]
    pub fn json(mut self, value: &Value) -> Self {
        self.builder = self
            .builder
            .header(header::CONTENT_TYPE, "application/json");
        self.body = Body::from(value.to_string());
        self
    }

    /// Send a raw body with a JSON content type.
    #[must_use]
    pub fn raw_json(mut self, body: &'static str) -> Self {
        self.builder = self
            .builder
            .header(header::CONTENT_TYPE, "application/json");
        self.body = Body::from(body);
        self
    }

    /// Attach a session cookie.
    #[must_use]
    pub fn cookie(mut self, cookie: &str) -> Self {
        self.builder = self.builder.header(header::COOKIE, cookie);
        self
    }

    /// Attach an arbitrary bearer token.
    #[must_use]
    pub fn bearer(mut self, token: &str) -> Self {
        self.builder = self
            .builder
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        self
    }

    /// Attach the configured admin token.
    #[must_use]
    pub fn admin(self) -> Self {
        self.bearer(ADMIN_TOKEN)
    }

    /// Attach an arbitrary header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Run the request through the router.
    pub async fn send(self) -> TestResponse {
        let request = self.builder.body(self.body).expect("valid test request");
        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let session_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|c| c.starts_with(broker_portal::middleware::session::SESSION_COOKIE_NAME))
            .and_then(|c| c.split(';').next())
            .map(str::to_owned);

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body is readable")
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
            session_cookie,
            request_id,
        }
    }
}

/// A fully read response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body (`Null` when the body is not JSON).
    pub body: Value,
    /// Raw body text.
    pub text: String,
    /// `name=value` of the session cookie, if one was set.
    pub session_cookie: Option<String>,
    /// Echoed `x-request-id` header.
    pub request_id: Option<String>,
}

impl TestResponse {
    /// A response header as a string, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
