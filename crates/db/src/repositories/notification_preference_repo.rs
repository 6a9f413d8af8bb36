//! Repository for the `notification_preferences` table.

use givehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{NotificationPreference, UpdatePreferences};
use crate::PgTx;

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "user_id, email_enabled, push_enabled, contribution_reminders, \
    reminder_frequency, achievement_notifications, project_updates, community_updates, \
    created_at, updated_at";

/// Provides CRUD operations for per-user notification preferences.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// Get a user's preference row, if one exists.
    ///
    /// Callers treat an absent row as the safe default: email enabled,
    /// push disabled, all categories enabled.
    pub async fn get(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1");
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or partially update a user's preferences.
    ///
    /// Uses `COALESCE` so only fields that are `Some` in the input
    /// overwrite the stored values.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdatePreferences,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences \
                (user_id, email_enabled, push_enabled, contribution_reminders, \
                 reminder_frequency, achievement_notifications, project_updates, community_updates) \
             VALUES ($1, COALESCE($2, true), COALESCE($3, false), COALESCE($4, true), \
                     COALESCE($5, 'monthly'), COALESCE($6, true), COALESCE($7, true), COALESCE($8, true)) \
             ON CONFLICT (user_id) DO UPDATE SET \
                email_enabled = COALESCE($2, notification_preferences.email_enabled), \
                push_enabled = COALESCE($3, notification_preferences.push_enabled), \
                contribution_reminders = COALESCE($4, notification_preferences.contribution_reminders), \
                reminder_frequency = COALESCE($5, notification_preferences.reminder_frequency), \
                achievement_notifications = COALESCE($6, notification_preferences.achievement_notifications), \
                project_updates = COALESCE($7, notification_preferences.project_updates), \
                community_updates = COALESCE($8, notification_preferences.community_updates), \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .bind(input.email_enabled)
            .bind(input.push_enabled)
            .bind(input.contribution_reminders)
            .bind(input.reminder_frequency.as_deref())
            .bind(input.achievement_notifications)
            .bind(input.project_updates)
            .bind(input.community_updates)
            .fetch_one(pool)
            .await
    }

    /// Preference rows of active users who opted into contribution
    /// reminders, in stable order for the daily sweep.
    pub async fn list_reminder_subscribers(
        pool: &PgPool,
    ) -> Result<Vec<NotificationPreference>, sqlx::Error> {
        sqlx::query_as::<_, NotificationPreference>(
            "SELECT p.user_id, p.email_enabled, p.push_enabled, p.contribution_reminders, \
                    p.reminder_frequency, p.achievement_notifications, p.project_updates, \
                    p.community_updates, p.created_at, p.updated_at \
             FROM notification_preferences p \
             JOIN users u ON u.id = p.user_id \
             WHERE p.contribution_reminders = true AND u.is_active = true \
             ORDER BY p.user_id",
        )
        .fetch_all(pool)
        .await
    }

    /// Delete a user's preference row inside a cascade transaction.
    pub async fn delete_for_user(tx: &mut PgTx<'_>, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notification_preferences WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
