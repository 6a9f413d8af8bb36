//! Contribution entity model and DTOs.

use givehub_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contributions` table.
///
/// `contributor_name` is denormalized from the user's display name at
/// submission time so the row stays meaningful after the owning account is
/// deleted and redacted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contribution {
    pub id: DbId,
    pub user_id: DbId,
    pub contributor_name: String,
    pub amount: Decimal,
    pub project_id: Option<DbId>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub submitted_at: Timestamp,
    pub decided_at: Option<Timestamp>,
    pub decided_by: Option<DbId>,
    pub user_deleted: bool,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for submitting a contribution.
#[derive(Debug, Deserialize)]
pub struct CreateContribution {
    pub user_id: DbId,
    pub amount: Decimal,
    pub project_id: Option<DbId>,
}
