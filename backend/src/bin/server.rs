//! Shift planning HTTP server binary.
//!
//! Loads the configuration, builds the repository, sets up the HTTP router
//! and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Empty in-memory repository
//! cargo run --bin shiftplan-server
//!
//! # Seeded from a fixture declared in a config file
//! SHIFTPLAN_CONFIG=backend/shiftplan.toml cargo run --bin shiftplan-server
//! ```
//!
//! # Environment Variables
//!
//! - `SHIFTPLAN_CONFIG`: Path to the TOML configuration file
//! - `HOST`: Server host (overrides the config file)
//! - `PORT`: Server port (overrides the config file)
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use shiftplan::config::AppConfig;
use shiftplan::db::RepositoryFactory;
use shiftplan::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting shift planning server");

    let config = AppConfig::load()?;
    let repository = RepositoryFactory::from_config(&config.storage)?;
    info!(storage = %config.storage.repo_type, "Repository initialized successfully");

    let addr: SocketAddr = config.bind_address().parse()?;
    let app = create_router(AppState::new(repository, config));

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
