//! Ledger Service - HTTP API for recording and retrieving transactions.
//!
//! This is the main entry point for the ledger service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledger_service::{create_router, AppState, ServiceConfig};
use ledger_store::RocksTable;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ledger_service=debug,ledger_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ledger Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        auth_base_url = %config.auth_base_url,
        "Service configuration loaded"
    );

    // Initialize RocksDB-backed table
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    let table = Arc::new(RocksTable::open(&config.data_dir)?);

    // Build app state
    let state = AppState::new(table, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
