//! Well-known notification event kind constants and category gating.
//!
//! Decision outcomes are transactional: they are always delivered
//! regardless of category toggles. Reminders and achievement unlocks are
//! gated by the owning user's preference categories.

/// A pending contribution was approved.
pub const KIND_CONTRIBUTION_APPROVED: &str = "contribution_approved";

/// A pending contribution was rejected.
pub const KIND_CONTRIBUTION_REJECTED: &str = "contribution_rejected";

/// Scheduled contribution reminder.
pub const KIND_REMINDER: &str = "reminder";

/// A milestone achievement was unlocked.
pub const KIND_ACHIEVEMENT_UNLOCKED: &str = "achievement_unlocked";

/// All valid event kinds.
pub const VALID_KINDS: &[&str] = &[
    KIND_CONTRIBUTION_APPROVED,
    KIND_CONTRIBUTION_REJECTED,
    KIND_REMINDER,
    KIND_ACHIEVEMENT_UNLOCKED,
];

/// The preference category gating an event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Always sent; category toggles do not apply.
    Transactional,
    /// Gated by `contribution_reminders`.
    ContributionReminders,
    /// Gated by `achievement_notifications`.
    AchievementNotifications,
}

/// Map an event kind to its gating category.
///
/// Unknown kinds are treated as transactional so a new kind is never
/// silently suppressed by a stale gating table.
pub fn category_for(kind: &str) -> Category {
    match kind {
        KIND_REMINDER => Category::ContributionReminders,
        KIND_ACHIEVEMENT_UNLOCKED => Category::AchievementNotifications,
        _ => Category::Transactional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_kinds_are_transactional() {
        assert_eq!(category_for(KIND_CONTRIBUTION_APPROVED), Category::Transactional);
        assert_eq!(category_for(KIND_CONTRIBUTION_REJECTED), Category::Transactional);
    }

    #[test]
    fn reminder_gated_by_contribution_reminders() {
        assert_eq!(category_for(KIND_REMINDER), Category::ContributionReminders);
    }

    #[test]
    fn achievement_gated_by_achievement_notifications() {
        assert_eq!(
            category_for(KIND_ACHIEVEMENT_UNLOCKED),
            Category::AchievementNotifications
        );
    }

    #[test]
    fn unknown_kind_defaults_to_transactional() {
        assert_eq!(category_for("something_new"), Category::Transactional);
    }
}
