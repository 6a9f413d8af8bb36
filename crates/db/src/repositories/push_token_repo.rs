//! Repository for the `push_tokens` table.

use givehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::push_token::{PushToken, RegisterPushToken};
use crate::PgTx;

/// Column list for `push_tokens` queries.
const COLUMNS: &str = "id, user_id, token, platform, created_at, last_seen_at";

/// Provides CRUD operations for registered device push tokens.
pub struct PushTokenRepo;

impl PushTokenRepo {
    /// Register a device token for a user.
    ///
    /// A token re-registered by the same or another user is moved to the
    /// new owner and its `last_seen_at` refreshed.
    pub async fn register(
        pool: &PgPool,
        user_id: DbId,
        input: &RegisterPushToken,
    ) -> Result<PushToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO push_tokens (user_id, token, platform) \
             VALUES ($1, $2, COALESCE($3, 'android')) \
             ON CONFLICT (token) DO UPDATE SET \
                user_id = EXCLUDED.user_id, \
                platform = EXCLUDED.platform, \
                last_seen_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PushToken>(&query)
            .bind(user_id)
            .bind(&input.token)
            .bind(input.platform.as_deref())
            .fetch_one(pool)
            .await
    }

    /// List a user's registered devices.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PushToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM push_tokens WHERE user_id = $1 ORDER BY last_seen_at DESC"
        );
        sqlx::query_as::<_, PushToken>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Just the token strings for a user, for the push sender.
    pub async fn tokens_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT token FROM push_tokens WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// IDs of all tokens belonging to a user (cascade partitioning).
    pub async fn ids_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM push_tokens WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a chunk of tokens inside a cascade transaction.
    pub async fn delete_by_ids(tx: &mut PgTx<'_>, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM push_tokens WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
