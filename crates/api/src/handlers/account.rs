//! Handler for the account-deletion trigger.
//!
//! The identity provider fires this after an account has already been
//! permanently removed upstream. The cascade purges or redacts the user's
//! records; a partial failure is logged for manual follow-up and still
//! answers 202; the identity deletion must never be blocked by cleanup.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use givehub_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Payload delivered by the identity provider on permanent account removal.
#[derive(Debug, Deserialize)]
pub struct AccountDeletedEvent {
    /// The removed user's internal id.
    pub uid: DbId,
    /// The removed account's email, for audit logging only.
    pub email: String,
}

/// POST /api/v1/account-deletions
///
/// Run the deletion cascade for a removed account. Always answers
/// 202 Accepted with the cascade report; failures are in the report and
/// the logs, never in the status code.
pub async fn account_deleted(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(event): Json<AccountDeletedEvent>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin()?;

    tracing::info!(user_id = event.uid, email = %event.email, "Account deletion received");

    let report = state.cascade.run(event.uid).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "data": report })),
    ))
}
