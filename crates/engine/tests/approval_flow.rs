//! Integration tests for the approval processor.
//!
//! Exercises the decide transaction against a real database: funding
//! aggregate updates, status derivation, idempotency of decisions, reward
//! credits, milestone achievements, and concurrent approvals against the
//! same project.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{dec, seed_contribution, seed_project, seed_user};
use givehub_core::contribution::Decision;
use givehub_core::error::CoreError;
use givehub_db::repositories::{
    AchievementRepo, ContributionRepo, NotificationRepo, ProjectRepo, RewardBalanceRepo,
};
use givehub_engine::{ApprovalProcessor, Dispatcher};
use sqlx::PgPool;

fn processor(pool: &PgPool) -> ApprovalProcessor {
    let dispatcher = Arc::new(Dispatcher::new(pool.clone(), None, None));
    ApprovalProcessor::new(pool.clone(), dispatcher)
}

// ---------------------------------------------------------------------------
// Test: approval updates funding and derives the status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn approve_updates_funding_and_derives_status(pool: PgPool) {
    let user = seed_user(&pool, "ada@example.com", "Ada").await;
    let project = seed_project(&pool, "Well Fund", "10000").await;
    let processor = processor(&pool);

    // First approval brings funding to 9000; target not yet reached.
    let first = seed_contribution(&pool, user.id, Some(project.id), "9000").await;
    let outcome = processor
        .decide(first.id, Decision::Approve, None, user.id)
        .await
        .unwrap();
    assert_eq!(outcome.contribution.status, "approved");
    assert!(outcome.contribution.decided_at.is_some());
    assert_eq!(outcome.contribution.decided_by, Some(user.id));

    let loaded = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(loaded.current_funding, dec("9000"));
    assert_eq!(loaded.funding_status, "open");

    // Second approval crosses the target: 9000 + 1500 = 10500.
    let second = seed_contribution(&pool, user.id, Some(project.id), "1500").await;
    processor
        .decide(second.id, Decision::Approve, None, user.id)
        .await
        .unwrap();

    let loaded = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(loaded.current_funding, dec("10500"));
    assert_eq!(loaded.funding_status, "fully_funded");

    // The channel of record saw both approvals.
    let notifications = NotificationRepo::list_for_user(&pool, user.id, false, 50, 0)
        .await
        .unwrap();
    let approved_count = notifications
        .iter()
        .filter(|n| n.kind == "contribution_approved")
        .count();
    assert_eq!(approved_count, 2);
}

// ---------------------------------------------------------------------------
// Test: duplicate decision is an invalid-state error, not a silent repeat
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_decision_returns_invalid_state(pool: PgPool) {
    let user = seed_user(&pool, "ada@example.com", "Ada").await;
    let project = seed_project(&pool, "Well Fund", "10000").await;
    let contribution = seed_contribution(&pool, user.id, Some(project.id), "250").await;
    let processor = processor(&pool);

    processor
        .decide(contribution.id, Decision::Approve, None, user.id)
        .await
        .unwrap();

    let err = processor
        .decide(contribution.id, Decision::Approve, None, user.id)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::InvalidState(_));

    let err = processor
        .decide(contribution.id, Decision::Reject, Some("late"), user.id)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::InvalidState(_));

    // The duplicate attempts changed nothing: funding counted exactly once.
    let loaded = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(loaded.current_funding, dec("250"));

    let stored = ContributionRepo::find_by_id(&pool, contribution.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "approved");
    assert!(stored.rejection_reason.is_none());
}

// ---------------------------------------------------------------------------
// Test: rejection never touches the funding aggregate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reject_leaves_funding_untouched(pool: PgPool) {
    let user = seed_user(&pool, "ada@example.com", "Ada").await;
    let project = seed_project(&pool, "Well Fund", "10000").await;
    let contribution = seed_contribution(&pool, user.id, Some(project.id), "500").await;
    let processor = processor(&pool);

    let outcome = processor
        .decide(
            contribution.id,
            Decision::Reject,
            Some("duplicate payment"),
            user.id,
        )
        .await
        .unwrap();
    assert_eq!(outcome.contribution.status, "rejected");
    assert_eq!(
        outcome.contribution.rejection_reason.as_deref(),
        Some("duplicate payment")
    );
    assert!(outcome.achievements.is_empty());

    let loaded = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(loaded.current_funding, dec("0"));
    assert_eq!(loaded.funding_status, "open");

    // No reward for a rejected contribution.
    let balance = RewardBalanceRepo::get(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(balance.points, 0);

    let notifications = NotificationRepo::list_for_user(&pool, user.id, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, "contribution_rejected");
    assert!(notifications[0].message.contains("duplicate payment"));
}

// ---------------------------------------------------------------------------
// Test: unknown contribution returns NotFound
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn decide_unknown_contribution_returns_not_found(pool: PgPool) {
    let user = seed_user(&pool, "ada@example.com", "Ada").await;
    let processor = processor(&pool);

    let err = processor
        .decide(999_999, Decision::Approve, None, user.id)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Contribution", .. });
}

// ---------------------------------------------------------------------------
// Test: a contribution without a project still approves
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn approve_without_project_credits_reward_only(pool: PgPool) {
    let user = seed_user(&pool, "ada@example.com", "Ada").await;
    let contribution = seed_contribution(&pool, user.id, None, "24.99").await;
    let processor = processor(&pool);

    let outcome = processor
        .decide(contribution.id, Decision::Approve, None, user.id)
        .await
        .unwrap();
    assert_eq!(outcome.contribution.status, "approved");

    // 24.99 truncates to 24 points.
    let balance = RewardBalanceRepo::get(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(balance.points, 24);
}

// ---------------------------------------------------------------------------
// Test: first approval unlocks the first-contribution milestone
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_approval_unlocks_milestone_achievement(pool: PgPool) {
    let user = seed_user(&pool, "ada@example.com", "Ada").await;
    let processor = processor(&pool);

    let first = seed_contribution(&pool, user.id, None, "10").await;
    let outcome = processor
        .decide(first.id, Decision::Approve, None, user.id)
        .await
        .unwrap();
    assert_eq!(outcome.achievements.len(), 1);
    assert_eq!(outcome.achievements[0].code, "first_contribution");

    // The unlock was fanned out as its own event.
    let notifications = NotificationRepo::list_for_user(&pool, user.id, false, 50, 0)
        .await
        .unwrap();
    assert!(notifications
        .iter()
        .any(|n| n.kind == "achievement_unlocked"));

    // A second approval sits between milestones: nothing new unlocks.
    let second = seed_contribution(&pool, user.id, None, "10").await;
    let outcome = processor
        .decide(second.id, Decision::Approve, None, user.id)
        .await
        .unwrap();
    assert!(outcome.achievements.is_empty());

    let achievements = AchievementRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(achievements.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: concurrent approvals against one project lose no updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_approvals_sum_exactly(pool: PgPool) {
    let user = seed_user(&pool, "ada@example.com", "Ada").await;
    let project = seed_project(&pool, "Well Fund", "100000").await;
    let processor = Arc::new(processor(&pool));

    let amounts = ["100", "250", "375.50", "1000", "42"];
    let mut contribution_ids = Vec::new();
    for amount in amounts {
        let c = seed_contribution(&pool, user.id, Some(project.id), amount).await;
        contribution_ids.push(c.id);
    }

    let mut handles = Vec::new();
    for id in contribution_ids {
        let processor = Arc::clone(&processor);
        let decider = user.id;
        handles.push(tokio::spawn(async move {
            processor.decide(id, Decision::Approve, None, decider).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Every amount landed exactly once: 100 + 250 + 375.50 + 1000 + 42.
    let loaded = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert_eq!(loaded.current_funding, dec("1767.50"));
    assert_eq!(loaded.funding_status, "open");
}
