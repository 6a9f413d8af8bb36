//! Operational diagnostics endpoints (admin only).
//!
//! Lets an operator inspect a user's push-token registration state and
//! fire a synthetic notification of a given template kind through the real
//! dispatch path.

use axum::extract::{Path, State};
use axum::Json;
use givehub_core::error::CoreError;
use givehub_core::events::VALID_KINDS;
use givehub_core::types::DbId;
use givehub_db::repositories::PushTokenRepo;
use givehub_engine::NotificationEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/diagnostics/users/{id}/push-tokens
///
/// Inspect a user's registered device tokens.
pub async fn push_token_state(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    let tokens = PushTokenRepo::list_for_user(&state.pool, user_id).await?;

    Ok(Json(serde_json::json!({
        "data": {
            "user_id": user_id,
            "token_count": tokens.len(),
            "tokens": tokens,
        }
    })))
}

/// Request body for `POST /diagnostics/test-notification`.
#[derive(Debug, Deserialize)]
pub struct TestNotificationRequest {
    /// The recipient user.
    pub user_id: DbId,
    /// Template kind to render (see `givehub_core::events`).
    pub kind: String,
    /// Optional payload passed to template rendering.
    pub payload: Option<serde_json::Value>,
}

/// POST /api/v1/diagnostics/test-notification
///
/// Dispatch a synthetic event through the full fan-out path and return the
/// per-channel report.
pub async fn test_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<TestNotificationRequest>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    if !VALID_KINDS.contains(&input.kind.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown event kind '{}'. Must be one of: {}",
            input.kind,
            VALID_KINDS.join(", ")
        ))));
    }

    let mut event = NotificationEvent::new(input.user_id, &input.kind);
    if let Some(payload) = input.payload {
        event = event.with_payload(payload);
    }

    let report = state.dispatcher.dispatch(&event).await;

    Ok(Json(serde_json::json!({ "data": report })))
}
