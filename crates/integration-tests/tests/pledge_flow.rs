//! End-to-end teacher and donor flow over HTTP.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`wl-cli migrate`)
//! - The server running (`cargo run -p wishlisted-server`)
//!
//! Run with: `cargo test -p wishlisted-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use wishlisted_integration_tests::{register, send_json, server_base_url};

/// A client with its own cookie jar, signed up under a fresh email.
async fn signed_up_client(role: &str) -> Client {
    register(role).await.0
}

/// Teacher with banking details, one wishlist and one item needing 3 units.
/// Returns the item ID and the wishlist's public URL on the test server.
async fn teacher_with_item() -> (i64, String) {
    let teacher = signed_up_client("teacher").await;

    let (status, _) = send_json(
        &teacher,
        reqwest::Method::PUT,
        "/api/teacher/profile",
        Some(json!({
            "fullName": "Ms. Rolle",
            "school": "Garvin Tynes Primary",
            "grade": "Grade 3",
            "location": "Nassau",
            "bankName": "Bank of The Bahamas",
            "accountHolder": "Tanya Rolle",
            "accountNumber": "0012345678",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, wishlist) = send_json(
        &teacher,
        reqwest::Method::POST,
        "/api/wishlists",
        Some(json!({"title": "Reading corner"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let wishlist_id = wishlist["id"].as_i64().expect("wishlist id");
    let share_token = wishlist["shareToken"].as_str().expect("share token");
    let share_url = format!("{}/wishlist/{share_token}", server_base_url());

    let (status, item) = send_json(
        &teacher,
        reqwest::Method::POST,
        &format!("/api/wishlists/{wishlist_id}/items"),
        Some(json!({"name": "Picture books", "quantity": 3, "estimatedPrice": "15.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (item["id"].as_i64().expect("item id"), share_url)
}

async fn donor() -> Client {
    let donor = signed_up_client("donor").await;
    let (status, _) = send_json(
        &donor,
        reqwest::Method::PUT,
        "/api/donor/profile",
        Some(json!({"displayName": "Kind Neighbour"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    donor
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_pledge_two_of_three_through_to_donated() {
    let (item_id, share_url) = teacher_with_item().await;
    let donor = donor().await;

    let (status, pledge) = send_json(
        &donor,
        reqwest::Method::POST,
        "/api/pledges",
        Some(json!({"itemId": item_id, "amount": "30.00", "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pledge["status"], "pending");
    assert!(
        pledge["transactionReference"]
            .as_str()
            .is_some_and(|r| r.starts_with("WL-"))
    );
    let pledge_id = pledge["id"].as_i64().expect("pledge id");

    // Share view shows the remaining unit.
    let shared: Value = Client::new()
        .get(&share_url)
        .send()
        .await
        .expect("share view")
        .json()
        .await
        .expect("share json");
    assert_eq!(shared["items"][0]["remaining"], 1);

    let (status, banking) = send_json(
        &donor,
        reqwest::Method::GET,
        &format!("/api/pledges/{pledge_id}/banking"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(banking["accountNumber"], "0012345678");

    let (status, pledge) = send_json(
        &donor,
        reqwest::Method::POST,
        &format!("/api/pledges/{pledge_id}/confirm"),
        Some(json!({"message": "Sent this morning"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pledge["status"], "confirmed");

    let (status, pledge) = send_json(
        &donor,
        reqwest::Method::POST,
        &format!("/api/pledges/{pledge_id}/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pledge["status"], "completed");

    let (status, profile) =
        send_json(&donor, reqwest::Method::GET, "/api/donor/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["totalDonated"], "30.00");
    assert_eq!(profile["totalPledged"], "0.00");

    // Banking is hidden once the pledge is closed.
    let (status, _) = send_json(
        &donor,
        reqwest::Method::GET,
        &format!("/api/pledges/{pledge_id}/banking"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_over_commit_is_refused() {
    let (item_id, _) = teacher_with_item().await;
    let first = donor().await;
    let second = donor().await;

    let (status, _) = send_json(
        &first,
        reqwest::Method::POST,
        "/api/pledges",
        Some(json!({"itemId": item_id, "amount": "30.00", "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &second,
        reqwest::Method::POST,
        "/api/pledges",
        Some(json!({"itemId": item_id, "amount": "30.00", "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_completed_pledge_cannot_be_cancelled() {
    let (item_id, _) = teacher_with_item().await;
    let donor = donor().await;

    let (_, pledge) = send_json(
        &donor,
        reqwest::Method::POST,
        "/api/pledges",
        Some(json!({"itemId": item_id, "amount": "15.00", "quantity": 1})),
    )
    .await;
    let pledge_id = pledge["id"].as_i64().expect("pledge id");

    // Skipping confirmation is refused.
    let (status, _) = send_json(
        &donor,
        reqwest::Method::POST,
        &format!("/api/pledges/{pledge_id}/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for action in ["confirm", "complete"] {
        let (status, _) = send_json(
            &donor,
            reqwest::Method::POST,
            &format!("/api/pledges/{pledge_id}/{action}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{action}");
    }

    let (status, _) = send_json(
        &donor,
        reqwest::Method::POST,
        &format!("/api/pledges/{pledge_id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_donor_cannot_reach_admin_queue() {
    let donor = donor().await;
    let (status, _) =
        send_json(&donor, reqwest::Method::GET, "/api/admin/teachers", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
