//! Repository for the `users` table.

use givehub_core::roles::ROLE_MEMBER;
use givehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};
use crate::PgTx;

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, display_name, role, is_active, created_at";

/// Provides CRUD operations for user profiles.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user profile with its default notification preference
    /// row and a zeroed reward balance, all in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users (email, display_name, role) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(input.role.as_deref().unwrap_or(ROLE_MEMBER))
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO notification_preferences (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO reward_balances (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email address.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Delete a user profile row inside a cascade transaction.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_profile(tx: &mut PgTx<'_>, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
