//! Login, logout and self-service profile tests.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use broker_portal_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_profile_requires_session() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/api/customers/profile")
        .send()
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_login_then_profile_is_own_record() {
    let app = TestApp::new();
    app.register("other@b.com", "secret1").await;
    let me = app.register("a@b.com", "secret1").await;

    let cookie = app.login("A@B.com", "secret1").await;
    let response = app
        .request(Method::GET, "/api/customers/profile")
        .cookie(&cookie)
        .send()
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"], me);
}

#[tokio::test]
async fn test_bad_password_and_unknown_email_look_the_same() {
    let app = TestApp::new();
    app.register("a@b.com", "secret1").await;

    let wrong_password = app
        .request(Method::POST, "/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "wrong-one" }))
        .send()
        .await;
    let unknown_email = app
        .request(Method::POST, "/api/auth/login")
        .json(&json!({ "email": "nobody@b.com", "password": "secret1" }))
        .send()
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert!(wrong_password.session_cookie.is_none());
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::new();

    let response = app
        .request(Method::POST, "/api/auth/login")
        .json(&json!({ "email": "a@b.com" }))
        .send()
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], json!(["Password is required"]));
}

#[tokio::test]
async fn test_partial_address_update_keeps_other_components() {
    let app = TestApp::new();
    app.register("a@b.com", "secret1").await;
    let cookie = app.login("a@b.com", "secret1").await;

    let response = app
        .request(Method::PUT, "/api/customers/profile")
        .cookie(&cookie)
        .json(&json!({ "address": { "city": "X" } }))
        .send()
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["address"],
        json!({ "street": "1 Main St", "city": "X", "zipCode": "62701" })
    );
}

#[tokio::test]
async fn test_profile_update_ignores_email_and_password() {
    let app = TestApp::new();
    let me = app.register("a@b.com", "secret1").await;
    let id = serde_json::from_value(me["id"].clone()).unwrap();
    let hash_before = app.password_hash(id).await;
    let cookie = app.login("a@b.com", "secret1").await;

    let response = app
        .request(Method::PUT, "/api/customers/profile")
        .cookie(&cookie)
        .json(&json!({ "lastName": "C", "email": "new@b.com", "password": "hijack1" }))
        .send()
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["lastName"], "C");
    assert_eq!(response.body["data"]["email"], "a@b.com");
    assert_eq!(app.password_hash(id).await, hash_before);
}

#[tokio::test]
async fn test_invalid_customer_type_leaves_record_unchanged() {
    let app = TestApp::new();
    let me = app.register("a@b.com", "secret1").await;
    let cookie = app.login("a@b.com", "secret1").await;

    let response = app
        .request(Method::PUT, "/api/customers/profile")
        .cookie(&cookie)
        .json(&json!({ "firstName": "Changed", "customerType": "Enterprise" }))
        .send()
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        json!(["Customer type must be either Individual or Business"])
    );

    let profile = app
        .request(Method::GET, "/api/customers/profile")
        .cookie(&cookie)
        .send()
        .await;
    assert_eq!(profile.body["data"], me);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    app.register("a@b.com", "secret1").await;
    let cookie = app.login("a@b.com", "secret1").await;

    let wrong = app
        .request(Method::PUT, "/api/customers/profile/password")
        .cookie(&cookie)
        .json(&json!({ "currentPassword": "nope-nope", "newPassword": "newsecret" }))
        .send()
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let short = app
        .request(Method::PUT, "/api/customers/profile/password")
        .cookie(&cookie)
        .json(&json!({ "currentPassword": "secret1", "newPassword": "abc" }))
        .send()
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let changed = app
        .request(Method::PUT, "/api/customers/profile/password")
        .cookie(&cookie)
        .json(&json!({ "currentPassword": "secret1", "newPassword": "newsecret" }))
        .send()
        .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert_eq!(changed.body["message"], "Password updated");

    let old = app
        .request(Method::POST, "/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "secret1" }))
        .send()
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    app.login("a@b.com", "newsecret").await;
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    app.register("a@b.com", "secret1").await;
    let cookie = app.login("a@b.com", "secret1").await;

    let logout = app
        .request(Method::POST, "/api/auth/logout")
        .cookie(&cookie)
        .send()
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["data"], json!({}));

    let profile = app
        .request(Method::GET, "/api/customers/profile")
        .cookie(&cookie)
        .send()
        .await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_customer_session_gets_not_found() {
    let app = TestApp::new();
    let me = app.register("a@b.com", "secret1").await;
    let cookie = app.login("a@b.com", "secret1").await;

    let deleted = app
        .request(Method::DELETE, &format!("/api/customers/{}", me["id"]))
        .admin()
        .send()
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let profile = app
        .request(Method::GET, "/api/customers/profile")
        .cookie(&cookie)
        .send()
        .await;
    assert_eq!(profile.status, StatusCode::NOT_FOUND);
}
