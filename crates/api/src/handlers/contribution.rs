//! Handlers for the contribution decision trigger.
//!
//! Deciding a contribution requires the admin role; authorization beyond
//! role membership (which projects an admin may decide for) belongs to the
//! identity provider's role assignment, not this service.

use axum::extract::{Path, State};
use axum::Json;
use givehub_core::contribution::Decision;
use givehub_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /contributions/{id}/decision`.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// `approve` or `reject`.
    pub action: Decision,
    /// Optional rejection reason, stored on the contribution.
    pub reason: Option<String>,
}

/// POST /api/v1/contributions/{id}/decision
///
/// Apply an approval or rejection decision. Typed failures:
/// 404 for an unknown contribution, 409 `INVALID_STATE` for one already
/// decided, 503 `CONCURRENCY` when the commit keeps losing races.
pub async fn decide(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(contribution_id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    let outcome = state
        .processor
        .decide(
            contribution_id,
            input.action,
            input.reason.as_deref(),
            auth.user_id,
        )
        .await?;

    Ok(Json(serde_json::json!({ "data": outcome })))
}
