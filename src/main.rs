//! E-Gate events backend
//!
//! Main application entry point

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use egate::{
    config::Settings,
    database::{connection, DatabaseConfig, MemoryStore, PgStore},
    handlers::{create_router, AppState},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", egate::info());

    let services = if settings.database.is_memory() {
        warn!("Using the in-memory store; data is lost on shutdown");
        ServiceFactory::new(Arc::new(MemoryStore::new()), &settings)
    } else {
        info!("Connecting to database...");
        let pool = connection::create_pool(&DatabaseConfig::from(&settings.database))
            .await
            .context("failed to connect to the database")?;
        connection::run_migrations(&pool).await?;
        ServiceFactory::new(Arc::new(PgStore::new(pool)), &settings)
    };

    let state = AppState::new(services, settings.pagination.clone());
    let app = create_router(state);

    let address = settings.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("E-Gate has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
