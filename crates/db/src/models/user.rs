//! User entity model and DTOs.

use givehub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
///
/// Authentication state lives with the external identity provider; this
/// table only carries the profile data the engine needs (email for the
/// email channel, display name for contribution denormalization).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a user profile.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
    pub role: Option<String>,
}
