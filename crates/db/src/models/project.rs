//! Project entity model and DTOs.

use givehub_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
///
/// `current_funding` is the funding aggregate: it is mutated only inside
/// the approval transaction, and `funding_status` is always derived from
/// `current_funding >= target_amount`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub target_amount: Decimal,
    pub current_funding: Decimal,
    pub funding_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub target_amount: Decimal,
}
