//! Health, routing and middleware tests.

use axum::http::{Method, StatusCode};
use broker_portal_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request(Method::GET, "/health").send().await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "ok");
}

#[tokio::test]
async fn test_readiness_pings_store() {
    let app = TestApp::new();
    let response = app.request(Method::GET, "/health/ready").send().await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_envelope_404() {
    let app = TestApp::new();
    let response = app.request(Method::GET, "/api/nothing-here").send().await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_wrong_method_is_envelope_405() {
    let app = TestApp::new();

    for (method, uri) in [
        (Method::GET, "/api/customers/register"),
        (Method::PUT, "/api/customers"),
        (Method::DELETE, "/api/customers/profile"),
        (Method::GET, "/api/auth/login"),
    ] {
        let response = app.request(method, uri).admin().send().await;
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert_eq!(response.body["success"], false, "{uri}");
        assert_eq!(response.body["error"], "Method not allowed", "{uri}");
    }
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = TestApp::new();

    let echoed = app
        .request(Method::GET, "/health")
        .header("x-request-id", "edge-1234")
        .send()
        .await;
    assert_eq!(echoed.request_id.as_deref(), Some("edge-1234"));

    let generated = app.request(Method::GET, "/health").send().await;
    assert!(generated.request_id.is_some_and(|id| id.len() == 36));
}

#[tokio::test]
async fn test_cors_allows_frontend_origin_with_credentials() {
    let app = TestApp::new();
    let response = app
        .request(Method::OPTIONS, "/api/customers/profile")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "GET")
        .send()
        .await;

    assert!(response.status.is_success());
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("http://localhost:3000")
    );
    assert_eq!(
        response.header("access-control-allow-credentials"),
        Some("true")
    );
}

#[tokio::test]
async fn test_cors_ignores_foreign_origin() {
    let app = TestApp::new();

    let preflight = app
        .request(Method::OPTIONS, "/api/customers/profile")
        .header("origin", "https://evil.example")
        .header("access-control-request-method", "GET")
        .send()
        .await;
    assert!(preflight.header("access-control-allow-origin").is_none());

    let simple = app
        .request(Method::GET, "/health")
        .header("origin", "https://evil.example")
        .send()
        .await;
    assert!(simple.header("access-control-allow-origin").is_none());
}
