use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use givehub_api::config::ServerConfig;
use givehub_api::router::build_app_router;
use givehub_api::state::AppState;
use givehub_engine::{
    ApprovalProcessor, DeletionCascade, Dispatcher, EmailConfig, EmailSender, HttpPushSender,
    PushConfig, PushSender, SmtpEmailSender,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "givehub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = givehub_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    givehub_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    givehub_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Channel senders ---
    // Absent provider configuration disables a channel; it is not an error.
    let email: Option<Arc<dyn EmailSender>> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "Email channel configured");
            Some(Arc::new(SmtpEmailSender::new(email_config)))
        }
        None => {
            tracing::info!("SMTP_HOST not set, email channel disabled");
            None
        }
    };
    let push: Option<Arc<dyn PushSender>> = match PushConfig::from_env() {
        Some(push_config) => {
            tracing::info!(url = %push_config.gateway_url, "Push channel configured");
            Some(Arc::new(HttpPushSender::new(push_config)))
        }
        None => {
            tracing::info!("PUSH_GATEWAY_URL not set, push channel disabled");
            None
        }
    };

    // --- Engine services ---
    let dispatcher = Arc::new(Dispatcher::new(pool.clone(), email, push));
    let processor = Arc::new(ApprovalProcessor::new(pool.clone(), Arc::clone(&dispatcher)));
    let cascade = Arc::new(DeletionCascade::new(pool.clone()));
    tracing::info!("Engine services created (dispatcher, approval processor, cascade)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        dispatcher,
        processor,
        cascade,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
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
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
