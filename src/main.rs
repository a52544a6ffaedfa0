//! Blog Service - server entry point

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blog_service::config::Environment;
use blog_service::{create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point for the blog service.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing (JSON logs in production)
/// 3. Build caches, repositories and services
/// 4. Start the background expiry cleanup task
/// 5. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(config.environment);

    info!("Starting blog service");
    info!(
        environment = ?config.environment,
        user_cache = ?config.user_cache,
        article_cache = ?config.article_cache,
        blocklist_capacity = config.blocklist_capacity,
        cleanup_interval_secs = config.cleanup_interval,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config).context("failed to build application state")?;

    let cleanup_handle = spawn_cleanup_task(
        state.caches.clone(),
        Duration::from_secs(config.cleanup_interval),
    );
    info!("Background cleanup task started");

    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Plain logs in development, JSON in production. `RUST_LOG` overrides the
/// default filter.
fn init_tracing(environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blog_service=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match environment {
        Environment::Development => registry.with(tracing_subscriber::fmt::layer()).init(),
        Environment::Production => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
