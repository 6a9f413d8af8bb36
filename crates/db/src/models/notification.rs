//! Notification entity models and DTOs.

use givehub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table (the in-app channel of record).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A row from the `notification_preferences` table (one per user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub user_id: DbId,
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub contribution_reminders: bool,
    pub reminder_frequency: String,
    pub achievement_notifications: bool,
    pub project_updates: bool,
    pub community_updates: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for updating notification preferences. Only `Some` fields are applied.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePreferences {
    pub email_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub contribution_reminders: Option<bool>,
    pub reminder_frequency: Option<String>,
    pub achievement_notifications: Option<bool>,
    pub project_updates: Option<bool>,
    pub community_updates: Option<bool>,
}
