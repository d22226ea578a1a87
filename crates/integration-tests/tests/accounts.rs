//! Signup, login, logout and admin account creation.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use faqdesk_integration_tests::{PASSWORD, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_customer_signup_sets_session_cookie() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/api/v1/signup/customer",
            None,
            json!({ "email": "ana@example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["message"], "customer created successfully");
    assert!(resp.body["customer_id"].is_number());
    let cookie = resp.set_cookie().unwrap();
    assert!(cookie.starts_with("faqdesk_session="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_merchant_signup_creates_store() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/api/v1/signup/merchant",
            None,
            json!({ "email": "mo@example.com", "password": PASSWORD, "store_name": "Mo's Shop" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let store_id = resp.body["store_id"].as_i64().unwrap();

    let store = app.get(&format!("/api/v1/stores/{store_id}")).await;
    assert_eq!(store.status, StatusCode::OK);
    assert_eq!(store.body["store"]["name"], "Mo's Shop");
    assert_eq!(store.body["store"]["merchant_id"], resp.body["merchant_id"]);
}

#[tokio::test]
async fn test_signup_reports_every_invalid_field() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/api/v1/signup/merchant",
            None,
            json!({ "email": "not-an-email", "password": "short", "store_name": "" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = resp.body["fields"].as_object().unwrap();
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));
    assert!(fields.contains_key("store_name"));
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.customer("dup@example.com").await;

    let resp = app
        .post(
            "/api/v1/signup/merchant",
            None,
            json!({ "email": "dup@example.com", "password": PASSWORD, "store_name": "Dup" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_rejects_wrong_password_and_unknown_email_alike() {
    let app = TestApp::new();
    app.customer("kai@example.com").await;

    let wrong = app
        .post(
            "/api/v1/login",
            None,
            json!({ "email": "kai@example.com", "password": "Wr0ng!pass" }),
        )
        .await;
    let unknown = app
        .post(
            "/api/v1/login",
            None,
            json!({ "email": "nobody@example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn test_login_returns_token_and_cookie() {
    let app = TestApp::new();
    app.customer("lee@example.com").await;

    let resp = app
        .post(
            "/api/v1/login",
            None,
            json!({ "email": "lee@example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let token = resp.body["token"].as_str().unwrap();
    assert!(resp.set_cookie().unwrap().contains(token));
    assert!(resp.body["expires_at"].is_string());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new();

    let resp = app.post("/api/v1/logout", None, json!({})).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.set_cookie().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_admin_creates_merchant_account() {
    let app = TestApp::new();
    let (_, admin) = app.admin("root@example.com").await;

    let resp = app
        .post(
            "/api/v1/admin/users",
            Some(&admin),
            json!({
                "email": "new@example.com",
                "password": PASSWORD,
                "role": "merchant",
                "store_name": "Fresh"
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED, "{:?}", resp.body);
    assert_eq!(resp.body["user"]["role"], "merchant");
    app.login("new@example.com").await;
}

#[tokio::test]
async fn test_admin_merchant_account_needs_store_name() {
    let app = TestApp::new();
    let (_, admin) = app.admin("root@example.com").await;

    let resp = app
        .post(
            "/api/v1/admin/users",
            Some(&admin),
            json!({ "email": "new@example.com", "password": PASSWORD, "role": "merchant" }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body["fields"]["store_name"].is_string());
}

#[tokio::test]
async fn test_only_admins_create_accounts() {
    let app = TestApp::new();
    let customer = app.customer("cy@example.com").await;
    let body = json!({ "email": "x@example.com", "password": PASSWORD, "role": "admin" });

    let anonymous = app.post("/api/v1/admin/users", None, body.clone()).await;
    let as_customer = app.post("/api/v1/admin/users", Some(&customer), body).await;

    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(as_customer.status, StatusCode::UNAUTHORIZED);
}
