use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use eventease_api::app::{create_app, AppState, Stores};
use eventease_api::config::{Config, StorageBackend};
use eventease_api::jobs::{JobScheduler, PoolMetricsJob, SessionCleanupJob};
use eventease_api::middleware::{init_logging, init_metrics};
use eventease_api::services::admin_bootstrap::bootstrap_admin;
use eventease_api::services::GeminiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging);
    init_metrics().context("failed to install metrics recorder")?;

    info!("Starting EventEase API v{}", env!("CARGO_PKG_VERSION"));

    let stores = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = persistence::db::create_pool(&(&config.database).into()).await?;
            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");
            Stores::postgres(pool)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Stores::in_memory()
        }
    };

    let generator = GeminiClient::new(config.assistant.clone())?;
    if !generator.is_configured() {
        info!("Assistant API key not set; assistant routes will report unavailable");
    }

    let addr = config.socket_addr()?;
    let state = AppState::new(config.clone(), stores, Arc::new(generator))?;

    let outcome = bootstrap_admin(state.auth.accounts().as_ref(), &config.admin).await?;
    info!(outcome = ?outcome, "Admin bootstrap finished");

    let mut scheduler = JobScheduler::new();
    scheduler.register(SessionCleanupJob::new(state.auth.clone()));
    if let Some(pool) = state.pool.clone() {
        scheduler.register(PoolMetricsJob::new(pool));
    }
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown(Duration::from_secs(10)).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
