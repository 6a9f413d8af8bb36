//! Well-known notification channel name constants.
//!
//! These identify delivery mechanisms in dispatch reports and logs. The
//! in-app channel is the channel of record: it is written before any
//! external channel is attempted.

/// In-app notification stored in the `notifications` table.
pub const CHANNEL_IN_APP: &str = "in_app";

/// Transactional email delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";

/// Mobile push delivered through the push gateway.
pub const CHANNEL_PUSH: &str = "push";
