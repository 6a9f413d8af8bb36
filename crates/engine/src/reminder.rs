//! Cadence-driven contribution reminders.
//!
//! [`ReminderSweep::run`] evaluates every reminder subscriber against the
//! given calendar date and dispatches a reminder event for each user whose
//! cadence fires. Eligibility is recomputed from the calendar on every run;
//! no sent-state is persisted, so re-running the sweep on the same eligible
//! day re-sends reminders (an accepted tradeoff: at worst one duplicate
//! per eligible day after a crash-and-restart).
//!
//! Users are processed independently: one user's lookup or dispatch failure
//! is recorded in the report and never aborts the sweep for the others.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use givehub_core::cadence::ReminderFrequency;
use givehub_core::events::KIND_REMINDER;
use givehub_core::types::DbId;
use givehub_db::repositories::{ContributionRepo, NotificationPreferenceRepo};
use givehub_db::DbPool;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::dispatch::Dispatcher;
use crate::event::NotificationEvent;

/// How often the scheduler loop wakes to run a sweep (once per day).
const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Per-user outcome collected by the sweep.
#[derive(Debug, Clone, Serialize)]
pub struct UserSweepOutcome {
    pub user_id: DbId,
    /// Whether the user's cadence fired on the sweep date.
    pub fired: bool,
    /// Failure description when the reminder could not be prepared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one sweep run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub date: NaiveDate,
    /// Subscribers evaluated against the cadence.
    pub evaluated: usize,
    /// Reminders dispatched.
    pub fired: usize,
    /// Users whose reminder failed (lookup or preference parse).
    pub failed: usize,
    pub outcomes: Vec<UserSweepOutcome>,
}

// ---------------------------------------------------------------------------
// ReminderSweep
// ---------------------------------------------------------------------------

/// Evaluates reminder cadences and dispatches reminder events.
pub struct ReminderSweep {
    pool: DbPool,
    dispatcher: Arc<Dispatcher>,
}

impl ReminderSweep {
    /// Create a sweep over the given pool and dispatcher.
    pub fn new(pool: DbPool, dispatcher: Arc<Dispatcher>) -> Self {
        Self { pool, dispatcher }
    }

    /// Run one sweep for the given calendar date.
    pub async fn run(&self, today: NaiveDate) -> SweepReport {
        let subscribers = match NotificationPreferenceRepo::list_reminder_subscribers(&self.pool)
            .await
        {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list reminder subscribers");
                return SweepReport {
                    date: today,
                    evaluated: 0,
                    fired: 0,
                    failed: 0,
                    outcomes: Vec::new(),
                };
            }
        };

        let mut outcomes = Vec::with_capacity(subscribers.len());
        for pref in &subscribers {
            let outcome = match ReminderFrequency::parse(&pref.reminder_frequency) {
                Some(frequency) if frequency.fires_on(today) => {
                    match self.remind_user(pref.user_id, today).await {
                        Ok(()) => UserSweepOutcome {
                            user_id: pref.user_id,
                            fired: true,
                            error: None,
                        },
                        Err(e) => {
                            tracing::error!(
                                user_id = pref.user_id,
                                error = %e,
                                "Reminder failed for user, continuing sweep"
                            );
                            UserSweepOutcome {
                                user_id: pref.user_id,
                                fired: false,
                                error: Some(e.to_string()),
                            }
                        }
                    }
                }
                Some(_) => UserSweepOutcome {
                    user_id: pref.user_id,
                    fired: false,
                    error: None,
                },
                None => {
                    tracing::warn!(
                        user_id = pref.user_id,
                        frequency = %pref.reminder_frequency,
                        "Unknown reminder frequency, skipping user"
                    );
                    UserSweepOutcome {
                        user_id: pref.user_id,
                        fired: false,
                        error: Some(format!(
                            "unknown reminder frequency '{}'",
                            pref.reminder_frequency
                        )),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let fired = outcomes.iter().filter(|o| o.fired).count();
        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        tracing::info!(
            date = %today,
            evaluated = outcomes.len(),
            fired,
            failed,
            "Reminder sweep complete"
        );
        SweepReport {
            date: today,
            evaluated: outcomes.len(),
            fired,
            failed,
            outcomes,
        }
    }

    /// Build and dispatch one user's reminder.
    async fn remind_user(&self, user_id: DbId, today: NaiveDate) -> Result<(), sqlx::Error> {
        let latest = ContributionRepo::latest_approved_for_user(&self.pool, user_id).await?;
        let streak = ContributionRepo::consecutive_month_streak(&self.pool, user_id, today).await?;

        let mut payload = serde_json::json!({ "streak_months": streak });
        if let Some(last_decided) = latest.and_then(|c| c.decided_at) {
            payload["last_contributed_on"] =
                serde_json::json!(last_decided.date_naive().to_string());
        }

        let event = NotificationEvent::new(user_id, KIND_REMINDER).with_payload(payload);
        // Dispatch never errors; channel failures live in its report/logs.
        self.dispatcher.dispatch(&event).await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ReminderScheduler
// ---------------------------------------------------------------------------

/// Background loop that runs the sweep once per day.
///
/// The first tick fires immediately on startup, which makes re-invocation
/// after a restart safe by the same duplicate-tolerance that covers
/// same-day re-runs.
pub struct ReminderScheduler {
    sweep: ReminderSweep,
}

impl ReminderScheduler {
    /// Create a scheduler around the given sweep.
    pub fn new(sweep: ReminderSweep) -> Self {
        Self { sweep }
    }

    /// Run the daily loop until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    let today = chrono::Utc::now().date_naive();
                    self.sweep.run(today).await;
                }
            }
        }
    }
}
