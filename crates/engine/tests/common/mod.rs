//! Shared fixtures and fake channel senders for engine integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use givehub_db::models::contribution::{Contribution, CreateContribution};
use givehub_db::models::project::{CreateProject, Project};
use givehub_db::models::user::{CreateUser, User};
use givehub_db::repositories::{ContributionRepo, ProjectRepo, UserRepo};
use givehub_engine::delivery::email::{EmailError, EmailReceipt};
use givehub_engine::delivery::push::{PushError, PushReceipt};
use givehub_engine::{EmailSender, PushSender};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub async fn seed_user(pool: &PgPool, email: &str, name: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: name.to_string(),
            role: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_project(pool: &PgPool, name: &str, target: &str) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            name: name.to_string(),
            target_amount: dec(target),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_contribution(
    pool: &PgPool,
    user_id: i64,
    project_id: Option<i64>,
    amount: &str,
) -> Contribution {
    ContributionRepo::create(
        pool,
        &CreateContribution {
            user_id,
            amount: dec(amount),
            project_id,
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Fake email senders
// ---------------------------------------------------------------------------

/// Records every send and always succeeds.
#[derive(Default)]
pub struct RecordingEmailSender {
    /// `(to_address, subject, html_body)` per call.
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(
        &self,
        to_address: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<EmailReceipt, EmailError> {
        self.sent.lock().unwrap().push((
            to_address.to_string(),
            subject.to_string(),
            html_body.to_string(),
        ));
        Ok(EmailReceipt {
            message_id: format!("<test-{}@fake>", self.sent.lock().unwrap().len()),
        })
    }
}

/// Always fails, as an unreachable SMTP relay would.
pub struct FailingEmailSender;

#[async_trait]
impl EmailSender for FailingEmailSender {
    async fn send(&self, _: &str, _: &str, _: &str) -> Result<EmailReceipt, EmailError> {
        Err(EmailError::Build("smtp relay unreachable".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Fake push senders
// ---------------------------------------------------------------------------

/// Records every send and reports a configurable per-token outcome.
pub struct RecordingPushSender {
    /// Token batches per call.
    pub calls: Mutex<Vec<Vec<String>>>,
    pub success_count: u32,
    pub failure_count: u32,
}

impl RecordingPushSender {
    pub fn accepting_all() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            success_count: u32::MAX, // replaced per-call with token count
            failure_count: 0,
        })
    }

    pub fn with_counts(success_count: u32, failure_count: u32) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            success_count,
            failure_count,
        })
    }
}

#[async_trait]
impl PushSender for RecordingPushSender {
    async fn send(
        &self,
        tokens: &[String],
        _title: &str,
        _body: &str,
        _data: &serde_json::Value,
    ) -> Result<PushReceipt, PushError> {
        self.calls.lock().unwrap().push(tokens.to_vec());
        let success_count = if self.success_count == u32::MAX {
            tokens.len() as u32
        } else {
            self.success_count
        };
        Ok(PushReceipt {
            success_count,
            failure_count: self.failure_count,
        })
    }
}
