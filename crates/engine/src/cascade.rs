//! Account-deletion cascade.
//!
//! When the identity provider permanently removes an account, every record
//! the user owns is deleted, except contributions, which are redacted so
//! historical funding totals stay correct. The cleanup is an explicit
//! ordered list of collection steps, chunked into partitions of at most
//! [`MAX_BATCH_OPS`] row-operations; each partition commits in its own
//! transaction so a failed run can resume from the first uncommitted
//! partition. Redaction is idempotent, which makes blind retries safe.
//!
//! A cascade failure is logged with the `user_id` for manual follow-up and
//! is never propagated: the upstream identity deletion has already
//! happened and must not be blocked.

use givehub_core::types::DbId;
use givehub_db::repositories::{
    AchievementRepo, ContributionRepo, NotificationPreferenceRepo, NotificationRepo,
    PushTokenRepo, RewardBalanceRepo, UserRepo,
};
use givehub_db::{DbPool, PgTx};
use serde::Serialize;

/// Maximum row-operations committed in one cascade partition.
pub const MAX_BATCH_OPS: usize = 500;

// ---------------------------------------------------------------------------
// Operations and report
// ---------------------------------------------------------------------------

/// One cleanup operation against a single collection.
#[derive(Debug, Clone)]
enum CascadeOp {
    DeleteNotifications(Vec<DbId>),
    DeleteAchievements(Vec<DbId>),
    DeletePushTokens(Vec<DbId>),
    DeletePreferences,
    DeleteRewardBalance,
    RedactContributions(Vec<DbId>),
    DeleteUserProfile,
}

impl CascadeOp {
    /// Number of row-operations this op contributes to a partition.
    fn op_count(&self) -> usize {
        match self {
            Self::DeleteNotifications(ids)
            | Self::DeleteAchievements(ids)
            | Self::DeletePushTokens(ids)
            | Self::RedactContributions(ids) => ids.len(),
            Self::DeletePreferences | Self::DeleteRewardBalance | Self::DeleteUserProfile => 1,
        }
    }

    /// Collection name for logs and the report.
    fn collection(&self) -> &'static str {
        match self {
            Self::DeleteNotifications(_) => "notifications",
            Self::DeleteAchievements(_) => "achievements",
            Self::DeletePushTokens(_) => "push_tokens",
            Self::DeletePreferences => "notification_preferences",
            Self::DeleteRewardBalance => "reward_balances",
            Self::RedactContributions(_) => "contributions",
            Self::DeleteUserProfile => "users",
        }
    }
}

/// Row counts accumulated across committed partitions.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CascadeCounts {
    pub notifications_deleted: u64,
    pub achievements_deleted: u64,
    pub push_tokens_deleted: u64,
    pub preferences_deleted: u64,
    pub balances_deleted: u64,
    pub contributions_redacted: u64,
    pub profiles_deleted: u64,
}

/// Summary of one cascade run.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeReport {
    pub user_id: DbId,
    /// Partitions planned for this run.
    pub total_partitions: usize,
    /// Partitions committed before the run finished or failed.
    pub committed_partitions: usize,
    pub counts: CascadeCounts,
    /// Failure description when the run stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CascadeReport {
    /// Whether every partition committed.
    pub fn completed(&self) -> bool {
        self.error.is_none() && self.committed_partitions == self.total_partitions
    }
}

// ---------------------------------------------------------------------------
// DeletionCascade
// ---------------------------------------------------------------------------

/// Executes the account-deletion cleanup for one user.
pub struct DeletionCascade {
    pool: DbPool,
}

impl DeletionCascade {
    /// Create a cascade runner over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the full cascade for `user_id`.
    ///
    /// Never returns an error; the report records how far the run got.
    /// Re-running after a partial failure is safe: deletes target rows that
    /// no longer exist and redaction skips already-redacted rows.
    pub async fn run(&self, user_id: DbId) -> CascadeReport {
        let ops = match self.plan(user_id).await {
            Ok(ops) => ops,
            Err(e) => {
                tracing::error!(
                    user_id,
                    error = %e,
                    "Failed to plan account-deletion cascade; manual follow-up required"
                );
                return CascadeReport {
                    user_id,
                    total_partitions: 0,
                    committed_partitions: 0,
                    counts: CascadeCounts::default(),
                    error: Some(e.to_string()),
                };
            }
        };

        let partitions = partition_ops(ops);
        let total_partitions = partitions.len();
        let mut counts = CascadeCounts::default();

        for (index, partition) in partitions.iter().enumerate() {
            if let Err(e) = self.commit_partition(partition, user_id, &mut counts).await {
                tracing::error!(
                    user_id,
                    partition = index,
                    total_partitions,
                    error = %e,
                    "Account-deletion cascade failed partway; retry resumes from this partition"
                );
                return CascadeReport {
                    user_id,
                    total_partitions,
                    committed_partitions: index,
                    counts,
                    error: Some(e.to_string()),
                };
            }
        }

        tracing::info!(
            user_id,
            partitions = total_partitions,
            notifications = counts.notifications_deleted,
            achievements = counts.achievements_deleted,
            push_tokens = counts.push_tokens_deleted,
            contributions_redacted = counts.contributions_redacted,
            "Account-deletion cascade complete"
        );
        CascadeReport {
            user_id,
            total_partitions,
            committed_partitions: total_partitions,
            counts,
            error: None,
        }
    }

    /// Build the ordered op list: bulk collections first (chunked), then
    /// the singleton rows, then contribution redaction, and the profile
    /// row last so a resumed run still finds the user.
    async fn plan(&self, user_id: DbId) -> Result<Vec<CascadeOp>, sqlx::Error> {
        let mut ops = Vec::new();

        let notification_ids = NotificationRepo::ids_for_user(&self.pool, user_id).await?;
        for chunk in notification_ids.chunks(MAX_BATCH_OPS) {
            ops.push(CascadeOp::DeleteNotifications(chunk.to_vec()));
        }

        let achievement_ids = AchievementRepo::ids_for_user(&self.pool, user_id).await?;
        for chunk in achievement_ids.chunks(MAX_BATCH_OPS) {
            ops.push(CascadeOp::DeleteAchievements(chunk.to_vec()));
        }

        let token_ids = PushTokenRepo::ids_for_user(&self.pool, user_id).await?;
        for chunk in token_ids.chunks(MAX_BATCH_OPS) {
            ops.push(CascadeOp::DeletePushTokens(chunk.to_vec()));
        }

        ops.push(CascadeOp::DeletePreferences);
        ops.push(CascadeOp::DeleteRewardBalance);

        let contribution_ids =
            ContributionRepo::unredacted_ids_for_user(&self.pool, user_id).await?;
        for chunk in contribution_ids.chunks(MAX_BATCH_OPS) {
            ops.push(CascadeOp::RedactContributions(chunk.to_vec()));
        }

        ops.push(CascadeOp::DeleteUserProfile);
        Ok(ops)
    }

    /// Commit one partition of operations in a single transaction.
    async fn commit_partition(
        &self,
        partition: &[CascadeOp],
        user_id: DbId,
        counts: &mut CascadeCounts,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut staged = CascadeCounts::default();

        for op in partition {
            apply_op(&mut tx, op, user_id, &mut staged).await.map_err(|e| {
                tracing::error!(
                    user_id,
                    collection = op.collection(),
                    error = %e,
                    "Cascade operation failed"
                );
                e
            })?;
        }

        tx.commit().await?;

        // Only fold the partition's counts in after its commit succeeds.
        counts.notifications_deleted += staged.notifications_deleted;
        counts.achievements_deleted += staged.achievements_deleted;
        counts.push_tokens_deleted += staged.push_tokens_deleted;
        counts.preferences_deleted += staged.preferences_deleted;
        counts.balances_deleted += staged.balances_deleted;
        counts.contributions_redacted += staged.contributions_redacted;
        counts.profiles_deleted += staged.profiles_deleted;
        Ok(())
    }
}

/// Execute one op inside the partition transaction.
async fn apply_op(
    tx: &mut PgTx<'_>,
    op: &CascadeOp,
    user_id: DbId,
    counts: &mut CascadeCounts,
) -> Result<(), sqlx::Error> {
    match op {
        CascadeOp::DeleteNotifications(ids) => {
            counts.notifications_deleted += NotificationRepo::delete_by_ids(tx, ids).await?;
        }
        CascadeOp::DeleteAchievements(ids) => {
            counts.achievements_deleted += AchievementRepo::delete_by_ids(tx, ids).await?;
        }
        CascadeOp::DeletePushTokens(ids) => {
            counts.push_tokens_deleted += PushTokenRepo::delete_by_ids(tx, ids).await?;
        }
        CascadeOp::DeletePreferences => {
            counts.preferences_deleted += NotificationPreferenceRepo::delete_for_user(tx, user_id).await?;
        }
        CascadeOp::DeleteRewardBalance => {
            counts.balances_deleted += RewardBalanceRepo::delete_for_user(tx, user_id).await?;
        }
        CascadeOp::RedactContributions(ids) => {
            counts.contributions_redacted += ContributionRepo::redact_by_ids(tx, ids).await?;
        }
        CascadeOp::DeleteUserProfile => {
            if UserRepo::delete_profile(tx, user_id).await? {
                counts.profiles_deleted += 1;
            }
        }
    }
    Ok(())
}

/// Pack ordered ops into partitions of at most [`MAX_BATCH_OPS`]
/// row-operations, preserving order.
fn partition_ops(ops: Vec<CascadeOp>) -> Vec<Vec<CascadeOp>> {
    let mut partitions: Vec<Vec<CascadeOp>> = Vec::new();
    let mut current: Vec<CascadeOp> = Vec::new();
    let mut current_count = 0;

    for op in ops {
        let count = op.op_count();
        if count == 0 {
            continue;
        }
        if current_count + count > MAX_BATCH_OPS && !current.is_empty() {
            partitions.push(std::mem::take(&mut current));
            current_count = 0;
        }
        current_count += count;
        current.push(op);
    }
    if !current.is_empty() {
        partitions.push(current);
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<DbId> {
        (1..=n as DbId).collect()
    }

    #[test]
    fn small_cascade_fits_one_partition() {
        let partitions = partition_ops(vec![
            CascadeOp::DeleteNotifications(ids(10)),
            CascadeOp::DeletePreferences,
            CascadeOp::DeleteRewardBalance,
            CascadeOp::RedactContributions(ids(3)),
            CascadeOp::DeleteUserProfile,
        ]);
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].len(), 5);
    }

    #[test]
    fn oversized_collections_split_across_partitions() {
        // 900 notification deletes pre-chunked into 500 + 400, plus the
        // singleton steps: the second chunk and singletons share a partition.
        let partitions = partition_ops(vec![
            CascadeOp::DeleteNotifications(ids(500)),
            CascadeOp::DeleteNotifications(ids(400)),
            CascadeOp::DeletePreferences,
            CascadeOp::DeleteUserProfile,
        ]);
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].len(), 1);
        assert_eq!(partitions[1].len(), 3);
    }

    #[test]
    fn empty_chunks_are_dropped() {
        let partitions = partition_ops(vec![
            CascadeOp::DeleteNotifications(Vec::new()),
            CascadeOp::DeleteUserProfile,
        ]);
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].len(), 1);
    }

    #[test]
    fn order_is_preserved_across_partitions() {
        let partitions = partition_ops(vec![
            CascadeOp::DeleteNotifications(ids(499)),
            CascadeOp::DeletePreferences,
            CascadeOp::DeleteRewardBalance,
            CascadeOp::DeleteUserProfile,
        ]);
        // 499 + 1 fills the first partition; the rest follow in order.
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0][1].collection(), "notification_preferences");
        assert_eq!(partitions[1][0].collection(), "reward_balances");
        assert_eq!(partitions[1][1].collection(), "users");
    }
}
