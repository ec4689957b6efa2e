//! Teacher review and banking visibility over HTTP.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`wl-cli migrate`)
//! - The server running against that database
//! - `WISHLISTED_DATABASE_URL` (or `DATABASE_URL`) set for the test process
//!
//! Run with: `cargo test -p wishlisted-integration-tests -- --ignored`

use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;

use wishlisted_core::{Email, UserRole};
use wishlisted_integration_tests::{register, send_json, test_pool};
use wishlisted_server::db::UserRepository;

async fn user_id(client: &Client) -> i64 {
    let (status, me) = send_json(client, Method::GET, "/api/auth/user", None).await;
    assert_eq!(status, StatusCode::OK);
    me["id"].as_i64().expect("user id")
}

/// A signed-in admin, promoted the way `wl-cli promote` does it.
async fn admin(pool: &PgPool) -> Client {
    let (client, email) = register("donor").await;
    UserRepository::new(pool)
        .set_role(&Email::parse(&email).expect("email"), UserRole::Admin)
        .await
        .expect("promote");
    client
}

/// Teacher with a completed profile. Returns the client and teacher ID.
async fn teacher(with_banking: bool) -> (Client, i64) {
    let (client, _) = register("teacher").await;

    let mut profile = json!({
        "fullName": "Mr. Ferguson",
        "school": "Eight Mile Rock High",
        "grade": "Grade 9",
        "location": "Grand Bahama",
    });
    if with_banking {
        profile["bankName"] = json!("RBC Royal Bank");
        profile["accountHolder"] = json!("Dion Ferguson");
        profile["accountNumber"] = json!("0099887766");
    }

    let (status, teacher) =
        send_json(&client, Method::PUT, "/api/teacher/profile", Some(profile)).await;
    assert_eq!(status, StatusCode::OK);
    let id = teacher["id"].as_i64().expect("teacher id");
    (client, id)
}

async fn item_for(teacher: &Client) -> i64 {
    let (status, wishlist) = send_json(
        teacher,
        Method::POST,
        "/api/wishlists",
        Some(json!({"title": "Science lab"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let wishlist_id = wishlist["id"].as_i64().expect("wishlist id");

    let (status, item) = send_json(
        teacher,
        Method::POST,
        &format!("/api/wishlists/{wishlist_id}/items"),
        Some(json!({"name": "Safety goggles", "quantity": 10, "estimatedPrice": "4.50"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    item["id"].as_i64().expect("item id")
}

/// Donor with a profile and one pending pledge on `item_id`.
async fn pledge_on(item_id: i64) -> (Client, i64) {
    let (donor, _) = register("donor").await;
    let (status, _) = send_json(
        &donor,
        Method::PUT,
        "/api/donor/profile",
        Some(json!({"displayName": "Harbour Island Rotary"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, pledge) = send_json(
        &donor,
        Method::POST,
        "/api/pledges",
        Some(json!({"itemId": item_id, "amount": "9.00", "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = pledge["id"].as_i64().expect("pledge id");
    (donor, id)
}

async fn banking_status(donor: &Client, pledge_id: i64) -> (StatusCode, Value) {
    send_json(
        donor,
        Method::GET,
        &format!("/api/pledges/{pledge_id}/banking"),
        None,
    )
    .await
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_promoted_session_reaches_queue_without_signing_in_again() {
    let pool = test_pool().await;
    let (client, email) = register("donor").await;

    let (status, _) = send_json(&client, Method::GET, "/api/admin/teachers", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    UserRepository::new(&pool)
        .set_role(&Email::parse(&email).expect("email"), UserRole::Admin)
        .await
        .expect("promote");

    let (status, queue) = send_json(&client, Method::GET, "/api/admin/teachers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(queue.is_array());

    let (_, me) = send_json(&client, Method::GET, "/api/auth/user", None).await;
    assert_eq!(me["role"], "admin");
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_approve_marks_teacher_verified() {
    let pool = test_pool().await;
    let admin = admin(&pool).await;
    let (teacher, teacher_id) = teacher(true).await;

    let (_, queue) = send_json(&admin, Method::GET, "/api/admin/teachers", None).await;
    assert!(
        queue
            .as_array()
            .expect("queue array")
            .iter()
            .any(|t| t["id"].as_i64() == Some(teacher_id))
    );

    let (status, approved) = send_json(
        &admin,
        Method::POST,
        &format!("/api/admin/teachers/{teacher_id}/approve"),
        Some(json!({"comment": "Confirmed with the school office"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["isTeacherVerified"], true);

    let (_, me) = send_json(&teacher, Method::GET, "/api/auth/user", None).await;
    assert_eq!(me["isTeacherVerified"], true);

    let (_, queue) = send_json(&admin, Method::GET, "/api/admin/teachers", None).await;
    assert!(
        !queue
            .as_array()
            .expect("queue array")
            .iter()
            .any(|t| t["id"].as_i64() == Some(teacher_id))
    );
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_reject_records_comment_and_removes_profile() {
    let pool = test_pool().await;
    let admin = admin(&pool).await;
    let (teacher, teacher_id) = teacher(false).await;
    let teacher_user_id = user_id(&teacher).await;

    let (status, review) = send_json(
        &admin,
        Method::POST,
        &format!("/api/admin/teachers/{teacher_id}/reject"),
        Some(json!({"comment": "School could not confirm employment"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["approved"], false);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers WHERE id = $1")
        .bind(teacher_id)
        .fetch_one(&pool)
        .await
        .expect("count teachers");
    assert_eq!(remaining, 0);

    let comments: Vec<Option<String>> = sqlx::query_scalar(
        "SELECT comment FROM teacher_reviews WHERE teacher_user_id = $1 AND NOT approved",
    )
    .bind(teacher_user_id)
    .fetch_all(&pool)
    .await
    .expect("load reviews");
    assert_eq!(
        comments,
        vec![Some("School could not confirm employment".to_string())]
    );

    let (_, me) = send_json(&teacher, Method::GET, "/api/auth/user", None).await;
    assert!(me["teacherId"].is_null());
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_reject_unknown_teacher_writes_nothing() {
    let pool = test_pool().await;
    let admin = admin(&pool).await;
    let admin_id = user_id(&admin).await;

    let (status, _) = send_json(
        &admin,
        Method::POST,
        &format!("/api/admin/teachers/{}/reject", i32::MAX),
        Some(json!({"comment": "No such teacher"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let written: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM teacher_reviews WHERE reviewer_id = $1")
            .bind(admin_id)
            .fetch_one(&pool)
            .await
            .expect("count reviews");
    assert_eq!(written, 0);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_banking_shown_while_open_and_hidden_after_cancel() {
    let (teacher, _) = teacher(true).await;
    let item_id = item_for(&teacher).await;
    let (donor, pledge_id) = pledge_on(item_id).await;

    let (status, banking) = banking_status(&donor, pledge_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(banking["accountNumber"], "0099887766");
    assert_eq!(banking["amount"], "9.00");

    let (status, _) = send_json(
        &donor,
        Method::POST,
        &format!("/api/pledges/{pledge_id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = banking_status(&donor, pledge_id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_banking_unavailable_without_teacher_details() {
    let (teacher, _) = teacher(false).await;
    let item_id = item_for(&teacher).await;
    let (donor, pledge_id) = pledge_on(item_id).await;

    let (status, body) = banking_status(&donor, pledge_id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_banking_is_private_to_the_pledging_donor() {
    let (teacher, _) = teacher(true).await;
    let item_id = item_for(&teacher).await;
    let (_, pledge_id) = pledge_on(item_id).await;
    let (other, _) = pledge_on(item_id).await;

    let (status, _) = banking_status(&other, pledge_id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
