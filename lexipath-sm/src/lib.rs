//! lexipath-sm library interface
//!
//! Exposes the application state, router, and service components for
//! integration testing.

pub mod api;
pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::services::{MediaStore, ScorerClient, SessionManager};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Assessment orchestration core
    pub sessions: SessionManager,
    /// Media blob storage
    pub media: MediaStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        scorer: Arc<ScorerClient>,
        media: MediaStore,
        public_base_url: String,
    ) -> Self {
        let sessions = SessionManager::new(db.clone(), scorer, public_base_url);
        Self {
            db,
            sessions,
            media,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let media_dir = state.media.root().to_path_buf();

    Router::new()
        .merge(api::assessment_routes())
        .merge(api::media_routes())
        .merge(api::health_routes())
        .nest_service("/media", ServeDir::new(media_dir))
        .with_state(state)
}
