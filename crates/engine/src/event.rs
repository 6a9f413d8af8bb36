//! The notification event envelope.
//!
//! A [`NotificationEvent`] is the ephemeral unit of work handed from a
//! mutating operation (approval, cascade, reminder sweep) to the
//! [`Dispatcher`](crate::dispatch::Dispatcher). It is constructed and
//! dispatched in the same call stack; there is no ambient trigger runtime
//! or persistent queue between the mutation and the fan-out.

use givehub_core::types::DbId;
use serde::{Deserialize, Serialize};

/// A domain event addressed to a single user.
///
/// Constructed via [`NotificationEvent::new`] and enriched with
/// [`with_payload`](NotificationEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// The recipient user.
    pub user_id: DbId,

    /// Event kind, e.g. `"contribution_approved"` (see
    /// `givehub_core::events`).
    pub kind: String,

    /// Free-form JSON payload consumed by template rendering.
    pub payload: serde_json::Value,
}

impl NotificationEvent {
    /// Create a new event with an empty payload.
    pub fn new(user_id: DbId, kind: impl Into<String>) -> Self {
        Self {
            user_id,
            kind: kind.into(),
            payload: serde_json::Value::Object(Default::default()),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}
