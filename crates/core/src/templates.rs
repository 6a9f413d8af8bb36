//! Notification template rendering.
//!
//! One template per event kind, rendered from the event payload. The same
//! rendered content feeds the in-app record, the email subject/body, and the
//! push title/body so every channel tells the user the same thing.

use serde_json::Value;

use crate::events::{
    KIND_ACHIEVEMENT_UNLOCKED, KIND_CONTRIBUTION_APPROVED, KIND_CONTRIBUTION_REJECTED,
    KIND_REMINDER,
};

/// Rendered notification content for all channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// Short in-app / push title.
    pub title: String,
    /// In-app / push body text.
    pub message: String,
    /// Optional in-app deep link.
    pub link: Option<String>,
    /// Email subject line.
    pub email_subject: String,
    /// Email HTML body.
    pub email_html: String,
}

/// String field from a JSON payload, empty when absent.
fn field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Render the template for `kind` from an event payload.
///
/// Payload keys used per kind:
/// - `contribution_approved`: `amount`, `project_name`
/// - `contribution_rejected`: `amount`, `reason`
/// - `reminder`: `last_contributed_on`, `streak_months`
/// - `achievement_unlocked`: `achievement_name`
pub fn render(kind: &str, payload: &Value) -> RenderedTemplate {
    match kind {
        KIND_CONTRIBUTION_APPROVED => {
            let amount = field(payload, "amount");
            let project = field(payload, "project_name");
            let message = if project.is_empty() {
                format!("Your contribution of {amount} has been approved.")
            } else {
                format!("Your contribution of {amount} to \"{project}\" has been approved.")
            };
            RenderedTemplate {
                title: "Contribution approved".to_string(),
                email_subject: "Your contribution was approved".to_string(),
                email_html: format!("<p>{message}</p><p>Thank you for giving!</p>"),
                message,
                link: Some("/contributions".to_string()),
            }
        }
        KIND_CONTRIBUTION_REJECTED => {
            let amount = field(payload, "amount");
            let reason = field(payload, "reason");
            let message = if reason.is_empty() {
                format!("Your contribution of {amount} could not be accepted.")
            } else {
                format!("Your contribution of {amount} could not be accepted: {reason}")
            };
            RenderedTemplate {
                title: "Contribution rejected".to_string(),
                email_subject: "About your recent contribution".to_string(),
                email_html: format!("<p>{message}</p>"),
                message,
                link: Some("/contributions".to_string()),
            }
        }
        KIND_REMINDER => {
            let last = field(payload, "last_contributed_on");
            let streak = payload.get("streak_months").and_then(Value::as_i64).unwrap_or(0);
            let mut message = if last.is_empty() {
                "It's a great day to make your first contribution.".to_string()
            } else {
                format!("You last contributed on {last}.")
            };
            if streak > 0 {
                message.push_str(&format!(
                    " Keep your {streak}-month streak going!"
                ));
            }
            RenderedTemplate {
                title: "Time to contribute".to_string(),
                email_subject: "Your contribution reminder".to_string(),
                email_html: format!("<p>{message}</p>"),
                message,
                link: Some("/projects".to_string()),
            }
        }
        KIND_ACHIEVEMENT_UNLOCKED => {
            let name = field(payload, "achievement_name");
            let message = format!("You unlocked the \"{name}\" achievement.");
            RenderedTemplate {
                title: "Achievement unlocked".to_string(),
                email_subject: format!("Achievement unlocked: {name}"),
                email_html: format!("<p>{message}</p>"),
                message,
                link: Some("/achievements".to_string()),
            }
        }
        other => RenderedTemplate {
            title: other.replace('_', " "),
            message: String::new(),
            link: None,
            email_subject: other.replace('_', " "),
            email_html: String::new(),
        },
    }
}
