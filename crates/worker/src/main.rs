//! Background worker hosting the daily reminder sweep.
//!
//! Runs [`ReminderScheduler`] on a daily interval until SIGINT/SIGTERM.
//! The first sweep fires immediately on startup; restarting the worker on
//! an eligible day may therefore re-send that day's reminders, which the
//! sweep tolerates by design.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use givehub_engine::{
    Dispatcher, EmailConfig, EmailSender, HttpPushSender, PushConfig, PushSender,
    ReminderScheduler, ReminderSweep, SmtpEmailSender,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "givehub_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = givehub_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    let email: Option<Arc<dyn EmailSender>> =
        EmailConfig::from_env().map(|c| Arc::new(SmtpEmailSender::new(c)) as _);
    let push: Option<Arc<dyn PushSender>> =
        PushConfig::from_env().map(|c| Arc::new(HttpPushSender::new(c)) as _);

    let dispatcher = Arc::new(Dispatcher::new(pool.clone(), email, push));
    let sweep = ReminderSweep::new(pool, dispatcher);
    let scheduler = ReminderScheduler::new(sweep);

    let cancel = CancellationToken::new();
    let scheduler_cancel = cancel.clone();
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_cancel).await;
    });

    tracing::info!("Worker started, reminder scheduler running");

    shutdown_signal().await;

    cancel.cancel();
    let _ = scheduler_handle.await;
    tracing::info!("Worker shut down");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
