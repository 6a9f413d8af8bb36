//! Contribution lifecycle and notification fan-out engine.
//!
//! This crate implements the three workflows that own the system's real
//! invariants:
//!
//! - [`ApprovalProcessor`] — decides pending contributions and keeps the
//!   project funding aggregate consistent in one transaction.
//! - [`Dispatcher`] — fans a [`NotificationEvent`] out to the in-app,
//!   email, and push channels, gated by per-user preferences.
//! - [`DeletionCascade`] — purges or redacts a departed user's records in
//!   resumable batches.
//! - [`ReminderSweep`] — the daily cadence-driven reminder job.

pub mod approval;
pub mod cascade;
pub mod delivery;
pub mod dispatch;
pub mod event;
pub mod reminder;

pub use approval::{ApprovalProcessor, DecisionOutcome};
pub use cascade::{CascadeReport, DeletionCascade};
pub use delivery::email::{EmailConfig, SmtpEmailSender};
pub use delivery::push::{HttpPushSender, PushConfig};
pub use dispatch::{ChannelOutcome, DispatchReport, Dispatcher, EmailSender, PushSender};
pub use event::NotificationEvent;
pub use reminder::{ReminderScheduler, ReminderSweep, SweepReport};
