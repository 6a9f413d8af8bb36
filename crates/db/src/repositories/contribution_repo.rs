//! Repository for the `contributions` table.

use chrono::{Datelike, NaiveDate};
use givehub_core::contribution::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use givehub_core::redaction::DELETED_SUFFIX;
use givehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::contribution::{Contribution, CreateContribution};
use crate::PgTx;

/// Column list for `contributions` queries.
const COLUMNS: &str = "\
    id, user_id, contributor_name, amount, project_id, status, rejection_reason, \
    submitted_at, decided_at, decided_by, user_deleted, deleted_at";

/// Provides CRUD operations for contributions.
pub struct ContributionRepo;

impl ContributionRepo {
    /// Insert a pending contribution, denormalizing the submitter's
    /// current display name onto the row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContribution,
    ) -> Result<Contribution, sqlx::Error> {
        let query = format!(
            "INSERT INTO contributions (user_id, contributor_name, amount, project_id, status) \
             SELECT u.id, u.display_name, $2, $3, $4 FROM users u WHERE u.id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contribution>(&query)
            .bind(input.user_id)
            .bind(input.amount)
            .bind(input.project_id)
            .bind(STATUS_PENDING)
            .fetch_one(pool)
            .await
    }

    /// Find a contribution by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Contribution>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contributions WHERE id = $1");
        sqlx::query_as::<_, Contribution>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a contribution row for a decision.
    ///
    /// The row lock pins the status read for the rest of the transaction,
    /// so two concurrent decisions on the same contribution serialize and
    /// the loser observes the already-decided status.
    pub async fn lock_for_decision(
        tx: &mut PgTx<'_>,
        id: DbId,
    ) -> Result<Option<Contribution>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contributions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Contribution>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Mark a locked pending contribution approved.
    pub async fn mark_approved(
        tx: &mut PgTx<'_>,
        id: DbId,
        decider_id: DbId,
    ) -> Result<Contribution, sqlx::Error> {
        let query = format!(
            "UPDATE contributions \
             SET status = $2, decided_at = NOW(), decided_by = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contribution>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(decider_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Mark a locked pending contribution rejected with an optional reason.
    pub async fn mark_rejected(
        tx: &mut PgTx<'_>,
        id: DbId,
        decider_id: DbId,
        reason: Option<&str>,
    ) -> Result<Contribution, sqlx::Error> {
        let query = format!(
            "UPDATE contributions \
             SET status = $2, decided_at = NOW(), decided_by = $3, rejection_reason = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contribution>(&query)
            .bind(id)
            .bind(STATUS_REJECTED)
            .bind(decider_id)
            .bind(reason)
            .fetch_one(&mut **tx)
            .await
    }

    /// Count a user's approved contributions (for milestone checks).
    pub async fn count_approved_for_user(
        tx: &mut PgTx<'_>,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contributions WHERE user_id = $1 AND status = $2",
        )
        .bind(user_id)
        .bind(STATUS_APPROVED)
        .fetch_one(&mut **tx)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// The user's most recent approved contribution, if any.
    pub async fn latest_approved_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Contribution>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contributions \
             WHERE user_id = $1 AND status = $2 \
             ORDER BY decided_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Contribution>(&query)
            .bind(user_id)
            .bind(STATUS_APPROVED)
            .fetch_optional(pool)
            .await
    }

    /// Consecutive-month approval streak ending at the month of `today`.
    ///
    /// Counts backwards from the current month over the user's distinct
    /// approved-contribution months; a missing month breaks the streak.
    pub async fn consecutive_month_streak(
        pool: &PgPool,
        user_id: DbId,
        today: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let months: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT DISTINCT date_trunc('month', decided_at)::date \
             FROM contributions \
             WHERE user_id = $1 AND status = $2 AND decided_at IS NOT NULL \
             ORDER BY 1 DESC",
        )
        .bind(user_id)
        .bind(STATUS_APPROVED)
        .fetch_all(pool)
        .await?;

        let mut expected = today.with_day(1).unwrap_or(today);
        let mut streak: i64 = 0;
        for month in months {
            if month != expected {
                break;
            }
            streak += 1;
            expected = previous_month(expected);
        }
        Ok(streak)
    }

    /// IDs of contributions not yet redacted for a departing user.
    pub async fn unredacted_ids_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM contributions \
             WHERE user_id = $1 AND user_deleted = false \
             ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Redact a chunk of contributions inside a cascade transaction.
    ///
    /// The `user_deleted = false` guard makes the update idempotent: a
    /// retried partition re-applies cleanly without double-suffixing.
    pub async fn redact_by_ids(tx: &mut PgTx<'_>, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE contributions \
             SET user_deleted = true, \
                 contributor_name = contributor_name || $2, \
                 deleted_at = NOW() \
             WHERE id = ANY($1) AND user_deleted = false",
        )
        .bind(ids)
        .bind(DELETED_SUFFIX)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// All contributions for a user (diagnostics and tests).
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Contribution>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contributions WHERE user_id = $1 ORDER BY submitted_at DESC"
        );
        sqlx::query_as::<_, Contribution>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}

/// The first day of the month before `month_start`.
fn previous_month(month_start: NaiveDate) -> NaiveDate {
    let (year, month) = if month_start.month() == 1 {
        (month_start.year() - 1, 12)
    } else {
        (month_start.year(), month_start.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(month_start)
}
