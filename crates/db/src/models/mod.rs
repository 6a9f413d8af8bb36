//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and updates where the API accepts them

pub mod achievement;
pub mod contribution;
pub mod notification;
pub mod project;
pub mod push_token;
pub mod reward_balance;
pub mod user;
