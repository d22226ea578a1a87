//! Per-client admission in front of the API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use faqdesk_integration_tests::{TestApp, TestResponse};
use faqdesk_server::config::RateLimitConfig;

fn single_shot() -> RateLimitConfig {
    RateLimitConfig {
        per_second: 0.0,
        burst: 1,
        idle_timeout: Duration::from_secs(180),
        sweep_interval: Duration::from_secs(60),
    }
}

async fn list_from(app: &TestApp, ip: &str) -> TestResponse {
    let request = Request::builder()
        .uri("/api/v1/faq-categories")
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn test_exhausted_bucket_is_rejected() {
    let app = TestApp::with_rate_limit(single_shot());

    let first = list_from(&app, "203.0.113.7").await;
    let second = list_from(&app, "203.0.113.7").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.body["error"], "rate limit exceeded");
    // A bucket that never refills has no retry time to advertise.
    assert!(second.headers.get(header::RETRY_AFTER).is_none());
}

#[tokio::test]
async fn test_clients_have_independent_buckets() {
    let app = TestApp::with_rate_limit(single_shot());

    assert_eq!(
        list_from(&app, "203.0.113.7").await.status,
        StatusCode::OK
    );
    assert_eq!(
        list_from(&app, "203.0.113.7").await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        list_from(&app, "198.51.100.4").await.status,
        StatusCode::OK
    );
    assert_eq!(app.state.rate_limiter().tracked(), 2);
}

#[tokio::test]
async fn test_rejected_before_authentication() {
    let app = TestApp::with_rate_limit(single_shot());
    list_from(&app, "203.0.113.7").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/faq-categories")
        .header("x-forwarded-for", "203.0.113.7")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"billing"}"#))
        .unwrap();
    let resp = app.send(request).await;

    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_refilling_bucket_advertises_retry_after() {
    let app = TestApp::with_rate_limit(RateLimitConfig {
        per_second: 0.5,
        ..single_shot()
    });

    list_from(&app, "203.0.113.7").await;
    let rejected = list_from(&app, "203.0.113.7").await;

    assert_eq!(rejected.status, StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = rejected.headers[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=2).contains(&retry_after));
}

#[tokio::test]
async fn test_health_is_not_limited() {
    let app = TestApp::with_rate_limit(single_shot());

    for _ in 0..3 {
        assert_eq!(app.get("/health").await.status, StatusCode::OK);
    }
}
