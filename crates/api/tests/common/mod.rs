//! Shared helpers for API integration tests.
//!
//! Builds the same router and middleware stack as the production binary,
//! with channel senders left unconfigured (in-app only), and provides
//! request/response helpers plus token factories.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use givehub_api::auth::jwt::{generate_access_token, JwtConfig};
use givehub_api::config::ServerConfig;
use givehub_api::router::build_app_router;
use givehub_api::state::AppState;
use givehub_engine::{ApprovalProcessor, DeletionCascade, Dispatcher};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses. No email or
/// push sender is configured: dispatches write the in-app channel only.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let dispatcher = Arc::new(Dispatcher::new(pool.clone(), None, None));
    let processor = Arc::new(ApprovalProcessor::new(pool.clone(), Arc::clone(&dispatcher)));
    let cascade = Arc::new(DeletionCascade::new(pool.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        dispatcher,
        processor,
        cascade,
    };

    build_app_router(state, &config)
}

/// Bearer token for an admin user with the given id.
pub fn admin_token(user_id: i64) -> String {
    generate_access_token(user_id, "admin", &test_config().jwt).unwrap()
}

/// Bearer token for a regular member with the given id.
pub fn member_token(user_id: i64) -> String {
    generate_access_token(user_id, "member", &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a Bearer token.
pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with an empty body and a Bearer token.
pub async fn post_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a PUT request with a JSON body and a Bearer token.
pub async fn put_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status code and return the parsed JSON body.
pub async fn expect_status(
    response: Response<Body>,
    status: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
