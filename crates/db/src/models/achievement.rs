//! Achievement entity model.

use givehub_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `achievements` table.
///
/// `(user_id, code)` is unique: unlocking the same milestone twice is a
/// no-op at the storage layer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Achievement {
    pub id: DbId,
    pub user_id: DbId,
    pub code: String,
    pub name: String,
    pub unlocked_at: Timestamp,
}
