//! Repository for the `reward_balances` table.

use givehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::reward_balance::RewardBalance;
use crate::PgTx;

/// Column list for `reward_balances` queries.
const COLUMNS: &str = "user_id, points, updated_at";

/// Provides operations on the per-user reward-currency balance.
pub struct RewardBalanceRepo;

impl RewardBalanceRepo {
    /// Get a user's balance row, if one exists.
    pub async fn get(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<RewardBalance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reward_balances WHERE user_id = $1");
        sqlx::query_as::<_, RewardBalance>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Credit points to a user inside the approval transaction.
    ///
    /// Creates the balance row if the user does not have one yet.
    pub async fn credit(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        points: i64,
    ) -> Result<RewardBalance, sqlx::Error> {
        let query = format!(
            "INSERT INTO reward_balances (user_id, points) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET \
                points = reward_balances.points + EXCLUDED.points, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RewardBalance>(&query)
            .bind(user_id)
            .bind(points)
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete a user's balance row inside a cascade transaction.
    pub async fn delete_for_user(tx: &mut PgTx<'_>, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reward_balances WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
