//! Contribution status constants and the decision state machine.
//!
//! A contribution is decided exactly once: `pending -> approved` or
//! `pending -> rejected`. Decided contributions are never mutated again
//! except for the account-deletion redaction of display data.

/// Contribution awaiting an administrator decision.
pub const STATUS_PENDING: &str = "pending";

/// Contribution accepted and counted into its project's funding aggregate.
pub const STATUS_APPROVED: &str = "approved";

/// Contribution declined; never counted into any funding aggregate.
pub const STATUS_REJECTED: &str = "rejected";

/// All valid contribution status values.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// An administrator's decision on a pending contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// The contribution status this decision transitions to.
    pub fn target_status(self) -> &'static str {
        match self {
            Self::Approve => STATUS_APPROVED,
            Self::Reject => STATUS_REJECTED,
        }
    }
}

/// Check whether a decision may be applied to a contribution in `status`.
///
/// Only `pending` contributions accept a decision; a repeat decision on an
/// already-decided contribution must surface as an invalid-state error, not
/// silently re-apply.
pub fn can_decide(status: &str) -> bool {
    status == STATUS_PENDING
}

/// Validate a decision against the current status, returning a message
/// suitable for an invalid-state error.
pub fn validate_transition(status: &str, decision: Decision) -> Result<(), String> {
    if can_decide(status) {
        Ok(())
    } else {
        Err(format!(
            "Cannot {} a contribution with status '{status}'; only '{STATUS_PENDING}' contributions accept a decision",
            match decision {
                Decision::Approve => "approve",
                Decision::Reject => "reject",
            }
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_accepts_both_decisions() {
        assert!(validate_transition(STATUS_PENDING, Decision::Approve).is_ok());
        assert!(validate_transition(STATUS_PENDING, Decision::Reject).is_ok());
    }

    #[test]
    fn approved_is_terminal() {
        let err = validate_transition(STATUS_APPROVED, Decision::Approve).unwrap_err();
        assert!(err.contains("approved"));
        assert!(validate_transition(STATUS_APPROVED, Decision::Reject).is_err());
    }

    #[test]
    fn rejected_is_terminal() {
        assert!(validate_transition(STATUS_REJECTED, Decision::Approve).is_err());
        assert!(validate_transition(STATUS_REJECTED, Decision::Reject).is_err());
    }

    #[test]
    fn decision_maps_to_target_status() {
        assert_eq!(Decision::Approve.target_status(), STATUS_APPROVED);
        assert_eq!(Decision::Reject.target_status(), STATUS_REJECTED);
    }

    #[test]
    fn decision_deserializes_lowercase() {
        let d: Decision = serde_json::from_str("\"approve\"").unwrap();
        assert_eq!(d, Decision::Approve);
        let d: Decision = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(d, Decision::Reject);
    }
}
