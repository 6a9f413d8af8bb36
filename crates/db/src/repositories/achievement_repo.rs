//! Repository for the `achievements` table.

use givehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::achievement::Achievement;
use crate::PgTx;

/// Column list for `achievements` queries.
const COLUMNS: &str = "id, user_id, code, name, unlocked_at";

/// Provides CRUD operations for unlocked achievements.
pub struct AchievementRepo;

impl AchievementRepo {
    /// Unlock an achievement for a user inside the approval transaction.
    ///
    /// Returns `None` if the user already holds the achievement
    /// (`ON CONFLICT DO NOTHING`; unlocks are idempotent).
    pub async fn unlock(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        code: &str,
        name: &str,
    ) -> Result<Option<Achievement>, sqlx::Error> {
        let query = format!(
            "INSERT INTO achievements (user_id, code, name) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, code) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(user_id)
            .bind(code)
            .bind(name)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List a user's achievements, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Achievement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM achievements WHERE user_id = $1 ORDER BY unlocked_at DESC"
        );
        sqlx::query_as::<_, Achievement>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// IDs of all achievements belonging to a user (cascade partitioning).
    pub async fn ids_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM achievements WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a chunk of achievements inside a cascade transaction.
    pub async fn delete_by_ids(tx: &mut PgTx<'_>, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM achievements WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
