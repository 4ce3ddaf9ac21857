//! # Estok HTTP Server
//!
//! Thin HTTP+JSON boundary in front of the inventory core.
//!
//! ## Startup Order
//! ```text
//! tracing init -> config load -> database connect + migrations
//!              -> router build -> serve with graceful shutdown
//! ```
//!
//! The serving loop is the only process lifecycle this binary owns: it is
//! started once, observable through logs, and stopped through OS signals
//! (Ctrl+C / SIGTERM). The core crates stay lifecycle-agnostic.

mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use estok_db::{Database, DbConfig};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Estok server...");

    // Load configuration (explicit object, injected below - core operations
    // never read the environment)
    let config = ServerConfig::load()?;
    info!(
        host = %config.host,
        port = config.port,
        database = %config.database_path,
        allow_negative_stock = config.allow_negative_stock,
        api_key_configured = config.api_key.is_some(),
        "Configuration loaded"
    );

    // Connect to the database and apply migrations
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = routes::router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Serving HTTP");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
