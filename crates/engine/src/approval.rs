//! The contribution approval processor.
//!
//! [`ApprovalProcessor::decide`] applies an administrator decision to a
//! pending contribution. The contribution status write, the project funding
//! update, the reward credit, and any milestone achievement unlock commit in
//! one transaction, or not at all. Notification fan-out happens strictly
//! after commit and never rolls the decision back.

use std::sync::Arc;

use givehub_core::contribution::{validate_transition, Decision};
use givehub_core::error::CoreError;
use givehub_core::events::{
    KIND_ACHIEVEMENT_UNLOCKED, KIND_CONTRIBUTION_APPROVED, KIND_CONTRIBUTION_REJECTED,
};
use givehub_core::funding;
use givehub_core::types::DbId;
use givehub_db::models::achievement::Achievement;
use givehub_db::models::contribution::Contribution;
use givehub_db::repositories::{
    AchievementRepo, ContributionRepo, ProjectRepo, RewardBalanceRepo,
};
use givehub_db::DbPool;
use serde::Serialize;

use crate::dispatch::{DispatchReport, Dispatcher};
use crate::event::NotificationEvent;

/// How many times a commit conflict is retried before surfacing
/// [`CoreError::Concurrency`].
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Approved-contribution counts that unlock a milestone achievement.
const MILESTONES: &[(i64, &str, &str)] = &[
    (1, "first_contribution", "First Contribution"),
    (5, "five_contributions", "Five Contributions"),
    (10, "ten_contributions", "Ten Contributions"),
    (25, "twenty_five_contributions", "Twenty-Five Contributions"),
];

/// The result of a successful decision.
#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    /// The contribution after the decision was applied.
    pub contribution: Contribution,
    /// Milestone achievements unlocked by this approval (empty on reject).
    pub achievements: Vec<Achievement>,
    /// Fan-out summary for the decision notification.
    pub dispatch: DispatchReport,
}

/// What a single committed decide transaction produced.
struct CommittedDecision {
    contribution: Contribution,
    project_name: Option<String>,
    achievements: Vec<Achievement>,
}

/// Applies approval/rejection decisions to pending contributions.
pub struct ApprovalProcessor {
    pool: DbPool,
    dispatcher: Arc<Dispatcher>,
}

impl ApprovalProcessor {
    /// Create a processor over the given pool and dispatcher.
    pub fn new(pool: DbPool, dispatcher: Arc<Dispatcher>) -> Self {
        Self { pool, dispatcher }
    }

    /// Decide a pending contribution.
    ///
    /// Returns [`CoreError::NotFound`] for an unknown contribution,
    /// [`CoreError::InvalidState`] for one already decided (the duplicate
    /// decision is a no-op error, never a silent repeat), and
    /// [`CoreError::Concurrency`] when the commit keeps losing races after
    /// [`MAX_COMMIT_ATTEMPTS`] tries, in which case the contribution is
    /// still `pending` and nothing was partially applied.
    pub async fn decide(
        &self,
        contribution_id: DbId,
        decision: Decision,
        reason: Option<&str>,
        decider_id: DbId,
    ) -> Result<DecisionOutcome, CoreError> {
        let mut attempt = 1;
        let committed = loop {
            match self
                .try_decide(contribution_id, decision, reason, decider_id)
                .await
            {
                Ok(committed) => break committed,
                Err(CoreError::Concurrency(msg)) if attempt < MAX_COMMIT_ATTEMPTS => {
                    tracing::warn!(
                        contribution_id,
                        attempt,
                        error = %msg,
                        "Decision transaction lost a commit race, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        // Post-commit fan-out. Funding correctness is already durable;
        // a delivery failure here is logged inside the dispatcher and
        // summarized in the report, never surfaced as a decision error.
        let event = decision_event(&committed, decision);
        let dispatch = self.dispatcher.dispatch(&event).await;

        for achievement in &committed.achievements {
            let event =
                NotificationEvent::new(committed.contribution.user_id, KIND_ACHIEVEMENT_UNLOCKED)
                    .with_payload(serde_json::json!({ "achievement_name": achievement.name }));
            self.dispatcher.dispatch(&event).await;
        }

        Ok(DecisionOutcome {
            contribution: committed.contribution,
            achievements: committed.achievements,
            dispatch,
        })
    }

    /// One attempt at the decide transaction.
    async fn try_decide(
        &self,
        contribution_id: DbId,
        decision: Decision,
        reason: Option<&str>,
        decider_id: DbId,
    ) -> Result<CommittedDecision, CoreError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let contribution = ContributionRepo::lock_for_decision(&mut tx, contribution_id)
            .await
            .map_err(map_db_error)?
            .ok_or(CoreError::NotFound {
                entity: "Contribution",
                id: contribution_id,
            })?;

        validate_transition(&contribution.status, decision).map_err(CoreError::InvalidState)?;

        let committed = match decision {
            Decision::Approve => {
                let decided = ContributionRepo::mark_approved(&mut tx, contribution_id, decider_id)
                    .await
                    .map_err(map_db_error)?;

                // Funding read-modify-write, pinned by the project row lock
                // so two concurrent approvals against the same project both
                // land in the total.
                let mut project_name = None;
                if let Some(project_id) = decided.project_id {
                    let project = ProjectRepo::lock_for_funding(&mut tx, project_id)
                        .await
                        .map_err(map_db_error)?
                        .ok_or(CoreError::NotFound {
                            entity: "Project",
                            id: project_id,
                        })?;
                    let new_funding = project.current_funding + decided.amount;
                    let status = funding::derive_status(new_funding, project.target_amount);
                    ProjectRepo::apply_funding(&mut tx, project_id, new_funding, status)
                        .await
                        .map_err(map_db_error)?;
                    project_name = Some(project.name);
                }

                let points = funding::reward_points(decided.amount);
                if points > 0 {
                    RewardBalanceRepo::credit(&mut tx, decided.user_id, points)
                        .await
                        .map_err(map_db_error)?;
                }

                let approved_count =
                    ContributionRepo::count_approved_for_user(&mut tx, decided.user_id)
                        .await
                        .map_err(map_db_error)?;
                let mut achievements = Vec::new();
                if let Some((_, code, name)) =
                    MILESTONES.iter().find(|(count, _, _)| *count == approved_count)
                {
                    if let Some(unlocked) =
                        AchievementRepo::unlock(&mut tx, decided.user_id, code, name)
                            .await
                            .map_err(map_db_error)?
                    {
                        achievements.push(unlocked);
                    }
                }

                CommittedDecision {
                    contribution: decided,
                    project_name,
                    achievements,
                }
            }
            Decision::Reject => {
                let decided =
                    ContributionRepo::mark_rejected(&mut tx, contribution_id, decider_id, reason)
                        .await
                        .map_err(map_db_error)?;
                CommittedDecision {
                    contribution: decided,
                    project_name: None,
                    achievements: Vec::new(),
                }
            }
        };

        tx.commit().await.map_err(map_db_error)?;

        tracing::info!(
            contribution_id,
            decider_id,
            status = %committed.contribution.status,
            "Contribution decided"
        );
        Ok(committed)
    }
}

/// Build the decision notification event from a committed transaction.
fn decision_event(committed: &CommittedDecision, decision: Decision) -> NotificationEvent {
    let contribution = &committed.contribution;
    match decision {
        Decision::Approve => {
            let mut payload = serde_json::json!({ "amount": contribution.amount.to_string() });
            if let Some(name) = &committed.project_name {
                payload["project_name"] = serde_json::json!(name);
            }
            NotificationEvent::new(contribution.user_id, KIND_CONTRIBUTION_APPROVED)
                .with_payload(payload)
        }
        Decision::Reject => {
            let mut payload = serde_json::json!({ "amount": contribution.amount.to_string() });
            if let Some(reason) = &contribution.rejection_reason {
                payload["reason"] = serde_json::json!(reason);
            }
            NotificationEvent::new(contribution.user_id, KIND_CONTRIBUTION_REJECTED)
                .with_payload(payload)
        }
    }
}

/// Map a sqlx error onto the domain taxonomy.
///
/// PostgreSQL serialization failures (40001) and deadlocks (40P01) become
/// [`CoreError::Concurrency`] so the caller's bounded retry loop can take
/// another pass; everything else is internal.
fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(db_err.code().as_deref(), Some("40001") | Some("40P01")) {
            return CoreError::Concurrency(db_err.to_string());
        }
    }
    CoreError::Internal(err.to_string())
}
