//! Foodstore HTTP server
//!
//! Serves the CRUD surface for every entity kind over the document database.
//!
//! # Configuration
//!
//! Environment variables:
//! - `FOODSTORE_CONFIG`: Path to config file (default: ~/.config/foodstore/config.yaml)
//! - `FOODSTORE_PORT`: Port to listen on (default: 8080)
//! - `FOODSTORE_DATABASE_PATH`: SQLite database (default: ~/.local/share/foodstore/foodstore.db)
//!
//! # Config File Format
//!
//! ```yaml
//! database_path: /var/lib/foodstore/foodstore.db
//! port: 8080
//! ```

use foodstore::config::Config;
use foodstore::db::Store;
use foodstore::server;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodstore=info,foodstore_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config_path = std::env::var("FOODSTORE_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;
    if let Some(path) = &config.config_file {
        tracing::info!("Config file: {}", path.display());
    }

    let store = Store::open(&config.database_path.value).await?;
    let app = server::app(&store);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port.value));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            tracing::warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}
