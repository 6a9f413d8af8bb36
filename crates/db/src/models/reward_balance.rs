//! Reward-currency balance model.

use givehub_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reward_balances` table (one per user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RewardBalance {
    pub user_id: DbId,
    pub points: i64,
    pub updated_at: Timestamp,
}
