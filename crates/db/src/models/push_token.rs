//! Push token entity model and DTOs.

use givehub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `push_tokens` table: one registered device.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PushToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub platform: String,
    pub created_at: Timestamp,
    pub last_seen_at: Timestamp,
}

/// DTO for registering a device token.
#[derive(Debug, Deserialize)]
pub struct RegisterPushToken {
    pub token: String,
    pub platform: Option<String>,
}
