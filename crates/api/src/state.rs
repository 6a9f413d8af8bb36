use std::sync::Arc;

use givehub_engine::{ApprovalProcessor, DeletionCascade, Dispatcher};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: givehub_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Notification fan-out dispatcher.
    pub dispatcher: Arc<Dispatcher>,
    /// Contribution approval processor.
    pub processor: Arc<ApprovalProcessor>,
    /// Account-deletion cascade runner.
    pub cascade: Arc<DeletionCascade>,
}
