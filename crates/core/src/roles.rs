//! Well-known user role name constants.
//!
//! These must match the values accepted by the `users.role` column check
//! constraint and the role claim embedded in access tokens.

/// Administrator: may decide contributions and trigger account cleanup.
pub const ROLE_ADMIN: &str = "admin";

/// Regular member: owns contributions, notifications, and preferences.
pub const ROLE_MEMBER: &str = "member";
