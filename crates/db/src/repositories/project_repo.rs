//! Repository for the `projects` table.

use givehub_core::funding::FUNDING_OPEN;
use givehub_core::types::DbId;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project};
use crate::PgTx;

/// Column list for `projects` queries.
const COLUMNS: &str =
    "id, name, target_amount, current_funding, funding_status, created_at, updated_at";

/// Provides CRUD operations for projects and their funding aggregate.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project with zero funding.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, target_amount, funding_status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(input.target_amount)
            .bind(FUNDING_OPEN)
            .fetch_one(pool)
            .await
    }

    /// Find a project by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a project row for a funding update.
    ///
    /// `SELECT ... FOR UPDATE` serializes concurrent approvals against the
    /// same project: the second transaction blocks until the first commits
    /// and then reads the updated total.
    pub async fn lock_for_funding(
        tx: &mut PgTx<'_>,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Write a new funding total and derived status inside the approval
    /// transaction. Must only be called on a row previously locked with
    /// [`lock_for_funding`](Self::lock_for_funding).
    pub async fn apply_funding(
        tx: &mut PgTx<'_>,
        id: DbId,
        new_funding: Decimal,
        funding_status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE projects \
             SET current_funding = $2, funding_status = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(new_funding)
        .bind(funding_status)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
