//! fv-scan library interface
//!
//! Exposes the router, application state, and pipeline components for
//! integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::config::ScanConfig;
pub use crate::error::{ScanError, ScanResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::services::inference_client::Classifier;
use crate::services::upload_staging::UploadStaging;

/// Application state shared across handlers.
///
/// All collaborators are constructed once at startup and injected here;
/// nothing is resolved from ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Upload staging area
    pub staging: UploadStaging,
    /// Inference service client (substitutable in tests)
    pub classifier: Arc<dyn Classifier>,
    /// Resolved service configuration
    pub config: ScanConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Most recent ingestion failure, surfaced by the health endpoint
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: ScanConfig, classifier: Arc<dyn Classifier>) -> Self {
        let staging = UploadStaging::new(config.upload_dir.clone(), config.max_upload_bytes);
        Self {
            db,
            staging,
            classifier,
            config,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    // Leave headroom above the staging ceiling so oversized uploads reach
    // staging and get the detailed TooLarge response.
    let body_limit = state.config.max_upload_bytes as usize + 64 * 1024;

    Router::new()
        .merge(api::scan_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
