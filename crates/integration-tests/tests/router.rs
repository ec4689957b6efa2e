//! Requests through the assembled application router.
//!
//! The pool never connects, so these cover everything that is decided
//! before a query runs: routing, auth, input shape and rate limiting.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use wishlisted_integration_tests::offline_state;
use wishlisted_server::app;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-real-ip", "203.0.113.7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_is_ok_without_database() {
    let response = app(offline_state()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let response = app(offline_state())
        .oneshot(get("/health/ready"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_protected_routes_require_sign_in() {
    for uri in [
        "/api/auth/user",
        "/api/teacher/profile",
        "/api/donor/profile",
        "/api/wishlists/mine",
        "/api/pledges",
        "/api/pledges/1/banking",
        "/api/admin/teachers",
    ] {
        let response = app(offline_state()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = json_body(response).await;
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_pledge_transitions_require_sign_in() {
    for action in ["confirm", "complete", "cancel"] {
        let response = app(offline_state())
            .oneshot(post_json(&format!("/api/pledges/1/{action}"), &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{action}");
    }
}

#[tokio::test]
async fn test_malformed_share_token_is_not_found() {
    let response = app(offline_state())
        .oneshot(get("/wishlist/not-a-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app(offline_state())
        .oneshot(get("/api/nothing-here"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_with_malformed_email_is_unauthorized() {
    let response = app(offline_state())
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "nope", "password": "whatever-123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_is_rate_limited_per_client() {
    let app = app(offline_state());
    let body = json!({"email": "nope", "password": "whatever-123"});

    let mut statuses = Vec::new();
    for _ in 0..6 {
        let response = app
            .clone()
            .oneshot(post_json("/api/auth/login", &body))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert!(statuses.iter().take(5).all(|s| *s == StatusCode::UNAUTHORIZED));
    assert_eq!(statuses.last(), Some(&StatusCode::TOO_MANY_REQUESTS));
}
