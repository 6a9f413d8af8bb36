//! Event-to-channel notification fan-out.
//!
//! [`Dispatcher::dispatch`] takes one [`NotificationEvent`] and delivers it
//! across the in-app, email, and push channels. The in-app record is the
//! channel of record and is written before any external channel is
//! attempted; external channels run concurrently, each behind a bounded
//! timeout, and a failure in one never blocks or rolls back another. The
//! call itself never returns an error; the caller gets a
//! [`DispatchReport`] describing what happened on each channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use givehub_core::channels::{CHANNEL_EMAIL, CHANNEL_IN_APP, CHANNEL_PUSH};
use givehub_core::events::{category_for, Category};
use givehub_core::templates::{render, RenderedTemplate};
use givehub_core::types::DbId;
use givehub_db::models::notification::NotificationPreference;
use givehub_db::repositories::{
    NotificationPreferenceRepo, NotificationRepo, PushTokenRepo, UserRepo,
};
use givehub_db::DbPool;
use serde::Serialize;

use crate::delivery::email::{EmailError, EmailReceipt};
use crate::delivery::push::{PushError, PushReceipt};
use crate::event::NotificationEvent;

/// Upper bound on a single external channel send, including connection
/// setup. A timed-out send is a delivery failure, not a retry trigger.
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Sender seams
// ---------------------------------------------------------------------------

/// Transactional email delivery.
///
/// Implemented by [`SmtpEmailSender`](crate::delivery::email::SmtpEmailSender)
/// in production and by in-memory fakes in tests.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one HTML email, returning the provider receipt.
    async fn send(
        &self,
        to_address: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<EmailReceipt, EmailError>;
}

/// Mobile push delivery to a batch of device tokens.
///
/// Implemented by [`HttpPushSender`](crate::delivery::push::HttpPushSender)
/// in production and by in-memory fakes in tests.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Send one message to all `tokens`, returning per-token accounting.
    async fn send(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> Result<PushReceipt, PushError>;
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// What happened on one channel during a dispatch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcome {
    /// The channel accepted the notification.
    Sent {
        /// In-app row id or provider message id, when available.
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// Push delivery with per-token accounting.
    SentToTokens { success_count: u32, failure_count: u32 },
    /// The channel was not attempted.
    Skipped { reason: String },
    /// The channel was attempted and failed; the failure was logged.
    Failed { error: String },
}

impl ChannelOutcome {
    fn skipped(reason: &str) -> Self {
        Self::Skipped {
            reason: reason.to_string(),
        }
    }

    /// Whether the channel accepted the notification.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. } | Self::SentToTokens { .. })
    }
}

/// Per-channel summary returned by [`Dispatcher::dispatch`].
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub user_id: DbId,
    pub kind: String,
    pub in_app: ChannelOutcome,
    pub email: ChannelOutcome,
    pub push: ChannelOutcome,
}

// ---------------------------------------------------------------------------
// Preference view
// ---------------------------------------------------------------------------

/// The gating flags a dispatch needs, with safe defaults applied when the
/// user has no stored preference row: email on, push off, all categories on.
struct EffectivePreferences {
    email_enabled: bool,
    push_enabled: bool,
    contribution_reminders: bool,
    achievement_notifications: bool,
}

impl EffectivePreferences {
    fn from_row(row: Option<&NotificationPreference>) -> Self {
        match row {
            Some(p) => Self {
                email_enabled: p.email_enabled,
                push_enabled: p.push_enabled,
                contribution_reminders: p.contribution_reminders,
                achievement_notifications: p.achievement_notifications,
            },
            None => Self {
                email_enabled: true,
                push_enabled: false,
                contribution_reminders: true,
                achievement_notifications: true,
            },
        }
    }

    /// Whether the gating category for `kind` is enabled.
    ///
    /// Decision outcomes are transactional and bypass category toggles.
    fn category_enabled(&self, kind: &str) -> bool {
        match category_for(kind) {
            Category::Transactional => true,
            Category::ContributionReminders => self.contribution_reminders,
            Category::AchievementNotifications => self.achievement_notifications,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Fans notification events out to the configured channels.
///
/// Senders are optional: an unconfigured channel is reported as skipped,
/// never as an error.
pub struct Dispatcher {
    pool: DbPool,
    email: Option<Arc<dyn EmailSender>>,
    push: Option<Arc<dyn PushSender>>,
}

impl Dispatcher {
    /// Create a dispatcher with the given channel senders.
    pub fn new(
        pool: DbPool,
        email: Option<Arc<dyn EmailSender>>,
        push: Option<Arc<dyn PushSender>>,
    ) -> Self {
        Self { pool, email, push }
    }

    /// Deliver one event across all channels.
    ///
    /// Never returns an error: every failure is logged and summarized in
    /// the returned [`DispatchReport`].
    pub async fn dispatch(&self, event: &NotificationEvent) -> DispatchReport {
        let template = render(&event.kind, &event.payload);

        // In-app first: if every external channel fails, the user still
        // sees the event in the notification feed.
        let in_app = self.write_in_app(event, &template).await;

        let prefs_row = match NotificationPreferenceRepo::get(&self.pool, event.user_id).await {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(
                    user_id = event.user_id,
                    error = %e,
                    "Failed to load notification preferences, using defaults"
                );
                None
            }
        };
        let prefs = EffectivePreferences::from_row(prefs_row.as_ref());

        if !prefs.category_enabled(&event.kind) {
            return DispatchReport {
                user_id: event.user_id,
                kind: event.kind.clone(),
                in_app,
                email: ChannelOutcome::skipped("category disabled"),
                push: ChannelOutcome::skipped("category disabled"),
            };
        }

        // External channels are independent: issue both sends concurrently
        // so a slow email provider does not delay push delivery.
        let (email, push) = tokio::join!(
            self.send_email(event, &template, &prefs),
            self.send_push(event, &template, &prefs),
        );

        let report = DispatchReport {
            user_id: event.user_id,
            kind: event.kind.clone(),
            in_app,
            email,
            push,
        };
        tracing::debug!(
            user_id = report.user_id,
            kind = %report.kind,
            in_app = report.in_app.is_sent(),
            email = report.email.is_sent(),
            push = report.push.is_sent(),
            "Dispatch complete"
        );
        report
    }

    /// Write the in-app notification row (the channel of record).
    async fn write_in_app(
        &self,
        event: &NotificationEvent,
        template: &RenderedTemplate,
    ) -> ChannelOutcome {
        match NotificationRepo::create(
            &self.pool,
            event.user_id,
            &event.kind,
            &template.title,
            &template.message,
            template.link.as_deref(),
        )
        .await
        {
            Ok(notification) => ChannelOutcome::Sent {
                detail: Some(notification.id.to_string()),
            },
            Err(e) => {
                tracing::error!(
                    user_id = event.user_id,
                    kind = %event.kind,
                    channel = CHANNEL_IN_APP,
                    error = %e,
                    "Failed to write in-app notification"
                );
                ChannelOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Attempt email delivery, if enabled and configured.
    async fn send_email(
        &self,
        event: &NotificationEvent,
        template: &RenderedTemplate,
        prefs: &EffectivePreferences,
    ) -> ChannelOutcome {
        if !prefs.email_enabled {
            return ChannelOutcome::skipped("email disabled by preference");
        }
        let Some(sender) = &self.email else {
            return ChannelOutcome::skipped("email sender not configured");
        };

        let to_address = match UserRepo::find_by_id(&self.pool, event.user_id).await {
            Ok(Some(user)) => user.email,
            Ok(None) => return ChannelOutcome::skipped("user not found"),
            Err(e) => {
                tracing::error!(user_id = event.user_id, error = %e, "Failed to load user for email");
                return ChannelOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let send = sender.send(&to_address, &template.email_subject, &template.email_html);
        match tokio::time::timeout(SEND_TIMEOUT, send).await {
            Ok(Ok(receipt)) => ChannelOutcome::Sent {
                detail: Some(receipt.message_id),
            },
            Ok(Err(e)) => {
                tracing::warn!(
                    user_id = event.user_id,
                    kind = %event.kind,
                    channel = CHANNEL_EMAIL,
                    error = %e,
                    "Email delivery failed"
                );
                ChannelOutcome::Failed {
                    error: e.to_string(),
                }
            }
            Err(_) => {
                tracing::warn!(
                    user_id = event.user_id,
                    kind = %event.kind,
                    channel = CHANNEL_EMAIL,
                    timeout_secs = SEND_TIMEOUT.as_secs(),
                    "Email delivery timed out"
                );
                ChannelOutcome::Failed {
                    error: "send timed out".to_string(),
                }
            }
        }
    }

    /// Attempt push delivery, if enabled, configured, and the user has at
    /// least one registered token.
    async fn send_push(
        &self,
        event: &NotificationEvent,
        template: &RenderedTemplate,
        prefs: &EffectivePreferences,
    ) -> ChannelOutcome {
        if !prefs.push_enabled {
            return ChannelOutcome::skipped("push disabled by preference");
        }
        let Some(sender) = &self.push else {
            return ChannelOutcome::skipped("push sender not configured");
        };

        let tokens = match PushTokenRepo::tokens_for_user(&self.pool, event.user_id).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!(user_id = event.user_id, error = %e, "Failed to load push tokens");
                return ChannelOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };
        if tokens.is_empty() {
            return ChannelOutcome::skipped("no registered push tokens");
        }

        let data = serde_json::json!({ "kind": event.kind, "link": template.link });
        let send = sender.send(&tokens, &template.title, &template.message, &data);
        match tokio::time::timeout(SEND_TIMEOUT, send).await {
            Ok(Ok(receipt)) => {
                if receipt.failure_count > 0 {
                    tracing::warn!(
                        user_id = event.user_id,
                        channel = CHANNEL_PUSH,
                        failure_count = receipt.failure_count,
                        "Some push tokens failed delivery"
                    );
                }
                ChannelOutcome::SentToTokens {
                    success_count: receipt.success_count,
                    failure_count: receipt.failure_count,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    user_id = event.user_id,
                    kind = %event.kind,
                    channel = CHANNEL_PUSH,
                    error = %e,
                    "Push delivery failed"
                );
                ChannelOutcome::Failed {
                    error: e.to_string(),
                }
            }
            Err(_) => {
                tracing::warn!(
                    user_id = event.user_id,
                    kind = %event.kind,
                    channel = CHANNEL_PUSH,
                    timeout_secs = SEND_TIMEOUT.as_secs(),
                    "Push delivery timed out"
                );
                ChannelOutcome::Failed {
                    error: "send timed out".to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_preference_row_is_absent() {
        let prefs = EffectivePreferences::from_row(None);
        assert!(prefs.email_enabled);
        assert!(!prefs.push_enabled);
        assert!(prefs.contribution_reminders);
        assert!(prefs.achievement_notifications);
    }

    #[test]
    fn transactional_kinds_bypass_category_toggles() {
        let prefs = EffectivePreferences {
            email_enabled: true,
            push_enabled: true,
            contribution_reminders: false,
            achievement_notifications: false,
        };
        assert!(prefs.category_enabled("contribution_approved"));
        assert!(prefs.category_enabled("contribution_rejected"));
        assert!(!prefs.category_enabled("reminder"));
        assert!(!prefs.category_enabled("achievement_unlocked"));
    }

    #[test]
    fn sent_outcomes_report_as_sent() {
        assert!(ChannelOutcome::Sent { detail: None }.is_sent());
        assert!(ChannelOutcome::SentToTokens {
            success_count: 1,
            failure_count: 2
        }
        .is_sent());
        assert!(!ChannelOutcome::skipped("x").is_sent());
        assert!(!ChannelOutcome::Failed {
            error: "x".to_string()
        }
        .is_sent());
    }
}
