// Welcome Service - Main HTTP Server
// Run with: cargo run --bin server

//! # Welcome Server Binary
//!
//! Starts the HTTP listener and, in parallel, the connection supervisor
//! that attaches the document store.
//!
//! ## Startup Order
//!
//! ```text
//! main()
//!   ├─ load .env and environment configuration
//!   ├─ spawn ConnectionSupervisor (retries until the store answers)
//!   └─ run WelcomeServer immediately (requests before attach get 503)
//! ```
//!
//! Ctrl+C or SIGTERM stops the HTTP server gracefully and cancels any pending
//! connection retry.
//!
//! ## Rust Learning Notes:
//!
//! ### Async Main Function
//! `#[tokio::main]` turns the async main function into a synchronous main
//! that builds the tokio runtime and blocks on it.
//!
//! ### Error Handling with Box<dyn Error>
//! `Box<dyn std::error::Error + Send + Sync>` can hold any error type, which
//! keeps `main` flexible about what can fail during startup.

use std::sync::Arc;

use dotenv::dotenv;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use welcome_service::{
    engine::redact_uri, server::shutdown_signal, AppConfig, ConnectionManager,
    ConnectionSupervisor, InMemoryConnector, MongoConnector, StoreBackend, StoreConnector,
    WelcomeServerBuilder,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // The .env file is optional; deployments usually set variables directly
    let dotenv_result = dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = dotenv_result {
        warn!("Could not load .env file: {}", e);
    }

    let config = AppConfig::from_env()?;

    info!("🚀 Starting Welcome Server...");
    info!("=====================================");
    info!("Listen: {}:{}", config.host, config.port);
    info!("Store backend: {:?}", config.store_backend);
    info!("Store URI: {}", redact_uri(&config.mongo_uri));
    info!("Retry delay: {}s", config.retry_delay_secs);

    let connector: Arc<dyn StoreConnector> = match config.store_backend {
        StoreBackend::Mongo => Arc::new(MongoConnector::new(config.connect_timeout())),
        StoreBackend::Memory => {
            warn!("Using in-memory store, records are lost on restart");
            Arc::new(InMemoryConnector::new())
        }
    };

    let manager = Arc::new(ConnectionManager::new());
    let shutdown = CancellationToken::new();

    // Runs in the background; the server below does not wait for it
    let supervisor = ConnectionSupervisor::new(
        connector,
        manager.clone(),
        config.supervisor_config(),
    )
    .spawn(shutdown.clone());

    let server_shutdown = shutdown.clone();
    WelcomeServerBuilder::new(manager)
        .with_config(config.server_config())
        .build_and_run(async move {
            shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await?;

    // Covers the case where the server exits before a signal arrives
    shutdown.cancel();
    let outcome = supervisor.await?;
    info!("Connection supervisor finished: {:?}", outcome);

    Ok(())
}
