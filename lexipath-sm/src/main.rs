//! lexipath-sm - Screening Manager service
//!
//! Drives a student through the five screening games, persists partial
//! progress, calls the external ML scorer for per-game and aggregate
//! risk, and serves assessment results to the rest of the platform.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use lexipath_common::config::ServiceConfig;
use lexipath_sm::services::{MediaStore, ScorerClient};
use lexipath_sm::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting lexipath-sm (Screening Manager) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration (env → TOML → defaults)
    let config = ServiceConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    info!("ML scorer endpoint: {}", config.ml_service_url);
    info!("Database: {}", config.database_path.display());

    // Initialize database connection pool
    let db_pool = lexipath_sm::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Scorer client: unreachable is survivable, every call degrades safely
    let scorer = Arc::new(ScorerClient::new(&config.ml_service_url, config.ml_timeout)?);
    if scorer.check_health().await {
        info!("ML scorer reachable");
    } else {
        warn!(
            "ML scorer unreachable at {}; scoring will degrade to defaults",
            config.ml_service_url
        );
    }

    // Media blob storage
    let media = MediaStore::new(config.media_dir.clone())?;
    info!("Media directory: {}", config.media_dir.display());

    // Create application state and router
    let state = AppState::new(db_pool, scorer, media, config.public_base_url.clone());
    let app = lexipath_sm::build_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
