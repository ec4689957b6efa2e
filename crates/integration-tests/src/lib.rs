//! Integration tests for WishListED Bahamas.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router and domain tests (no database needed)
//! cargo test -p wishlisted-integration-tests
//!
//! # Full HTTP flow against a running server with a migrated database
//! WISHLISTED_TEST_URL=http://localhost:3000 \
//!     cargo test -p wishlisted-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `pledge_rules` - Quantity, lifecycle and donor total rules
//! - `router` - Routing, auth and rate limiting through the real `Router`
//! - `pledge_flow` - End-to-end teacher/donor flow over HTTP
//! - `admin_queue` - Teacher review, banking visibility and role changes over HTTP

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;
use wishlisted_server::config::{SentryConfig, ServerConfig};
use wishlisted_server::state::AppState;

/// Base URL of a running server for the ignored end-to-end tests.
#[must_use]
pub fn server_base_url() -> String {
    std::env::var("WISHLISTED_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Configuration pointing at a database that is never reached.
///
/// # Panics
///
/// Panics if the hard-coded base URL does not parse.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn offline_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://wishlisted@127.0.0.1:1/wishlisted_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: url::Url::parse("https://wishlisted.test").unwrap(),
        recent_limit: 6,
        cors_origin: None,
        sentry: SentryConfig::default(),
    }
}

/// State whose pool connects lazily, for routes that fail before any query.
///
/// # Panics
///
/// Panics if the lazy pool options are rejected.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn offline_state() -> AppState {
    let config = offline_config();
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://wishlisted@127.0.0.1:1/wishlisted_test")
        .unwrap();
    AppState::new(config, pool)
}

/// Password used for every account the HTTP tests create.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Register a fresh account with its own cookie jar.
///
/// Returns the signed-in client and the email it registered with.
///
/// # Panics
///
/// Panics if the server is unreachable or refuses the sign-up.
pub async fn register(role: &str) -> (Client, String) {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client");

    let email = format!("{role}-{}@wishlisted.test", Uuid::new_v4());
    let (status, _) = send_json(
        &client,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "email": email,
            "password": TEST_PASSWORD,
            "passwordConfirm": TEST_PASSWORD,
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {role}");

    (client, email)
}

/// Send a request to the test server and decode any JSON body.
///
/// A body that is empty or not JSON decodes as `Value::Null`.
///
/// # Panics
///
/// Panics if the request cannot be sent.
pub async fn send_json(
    client: &Client,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = client.request(method, format!("{}{path}", server_base_url()));
    if let Some(body) = body {
        request = request.json(&body);
    }
    let resp = request.send().await.expect("Request failed");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Pool on the same database as the test server.
///
/// # Panics
///
/// Panics if neither `WISHLISTED_DATABASE_URL` nor `DATABASE_URL` is set or
/// the database is unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("WISHLISTED_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("WISHLISTED_DATABASE_URL or DATABASE_URL must be set");
    PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database")
}
