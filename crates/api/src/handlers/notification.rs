//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`] and operate only
//! on the authenticated user's own records.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use givehub_core::error::CoreError;
use givehub_core::types::DbId;
use givehub_db::models::notification::UpdatePreferences;
use givehub_db::repositories::{NotificationPreferenceRepo, NotificationRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for notification listing.
const DEFAULT_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Notification CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// List the authenticated user's notifications with optional filtering.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);
    let unread_only = params.unread_only.unwrap_or(false);

    let notifications =
        NotificationRepo::list_for_user(&state.pool, auth.user_id, unread_only, limit, offset)
            .await?;

    Ok(Json(serde_json::json!({ "data": notifications })))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark a single notification as read. Returns 204 No Content on success,
/// or 404 if the notification does not belong to the authenticated user.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = NotificationRepo::mark_read(&state.pool, notification_id, auth.user_id).await?;

    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
///
/// Mark all of the authenticated user's notifications as read.
/// Returns the number of notifications that were marked.
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "marked_read": count }
    })))
}

/// GET /api/v1/notifications/unread-count
///
/// Return the number of unread notifications for the authenticated user.
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "count": count }
    })))
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications/preferences
///
/// Get the authenticated user's notification preferences. An account that
/// has never stored preferences gets the defaults materialized on first
/// read so the client always has a full toggle set to render.
pub async fn get_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let prefs = match NotificationPreferenceRepo::get(&state.pool, auth.user_id).await? {
        Some(prefs) => prefs,
        None => {
            NotificationPreferenceRepo::upsert(
                &state.pool,
                auth.user_id,
                &UpdatePreferences::default(),
            )
            .await?
        }
    };

    Ok(Json(serde_json::json!({ "data": prefs })))
}

/// PUT /api/v1/notifications/preferences
///
/// Partially update the authenticated user's preferences. Only fields
/// present in the body are changed.
pub async fn update_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdatePreferences>,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(frequency) = input.reminder_frequency.as_deref() {
        if givehub_core::cadence::ReminderFrequency::parse(frequency).is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid reminder_frequency '{frequency}'. Must be one of: weekly, biweekly, monthly"
            ))));
        }
    }

    let prefs = NotificationPreferenceRepo::upsert(&state.pool, auth.user_id, &input).await?;

    Ok(Json(serde_json::json!({ "data": prefs })))
}
