//! HTTP-level integration tests for the notifications and preferences API.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, expect_status, get_auth, member_token, post_auth, put_json_auth,
};
use givehub_db::models::user::CreateUser;
use givehub_db::repositories::{NotificationRepo, UserRepo};
use sqlx::PgPool;

async fn seed_member(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "ada@example.com".to_string(),
            display_name: "Ada".to_string(),
            role: None,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Test: list and unread count
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_and_unread_count(pool: PgPool) {
    let user_id = seed_member(&pool).await;
    let token = member_token(user_id);
    for i in 0..3 {
        NotificationRepo::create(&pool, user_id, "reminder", &format!("T{i}"), "Body", None)
            .await
            .unwrap();
    }

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications",
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/unread-count",
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["count"], 3);

    // Pagination caps and offsets apply.
    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/notifications?limit=2&offset=2",
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: mark one read, mark all read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_read_and_read_all(pool: PgPool) {
    let user_id = seed_member(&pool).await;
    let token = member_token(user_id);
    let n = NotificationRepo::create(&pool, user_id, "reminder", "Title", "Body", None)
        .await
        .unwrap();
    NotificationRepo::create(&pool, user_id, "reminder", "Title", "Body", None)
        .await
        .unwrap();

    let response = post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/notifications/{}/read", n.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Someone else's notification id is a 404.
    let other = seed_other_member(&pool).await;
    let response = post_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/notifications/{}/read", n.id),
        &member_token(other),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/read-all",
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["marked_read"], 1);

    assert_eq!(NotificationRepo::unread_count(&pool, user_id).await.unwrap(), 0);
}

async fn seed_other_member(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "other@example.com".to_string(),
            display_name: "Other".to_string(),
            role: None,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Test: preference get materializes defaults, put updates partially
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn preferences_get_and_partial_update(pool: PgPool) {
    let user_id = seed_member(&pool).await;
    let token = member_token(user_id);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/preferences",
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["email_enabled"], true);
    assert_eq!(json["data"]["push_enabled"], false);
    assert_eq!(json["data"]["reminder_frequency"], "monthly");

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications/preferences",
        &token,
        serde_json::json!({"reminder_frequency": "biweekly", "push_enabled": true}),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["reminder_frequency"], "biweekly");
    assert_eq!(json["data"]["push_enabled"], true);
    // Untouched fields keep their values.
    assert_eq!(json["data"]["email_enabled"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_reminder_frequency_is_rejected(pool: PgPool) {
    let user_id = seed_member(&pool).await;

    let response = put_json_auth(
        common::build_test_app(pool),
        "/api/v1/notifications/preferences",
        &member_token(user_id),
        serde_json::json!({"reminder_frequency": "fortnightly"}),
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: endpoints require authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn notifications_require_auth(pool: PgPool) {
    let response = common::get(common::build_test_app(pool), "/api/v1/notifications").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}
