//! fv-scan - Crop Scan Ingestion Service
//!
//! Accepts crop photo uploads, forwards them to the external disease
//! classifier, and records the diagnosis for later review and reporting.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fv_scan::services::inference_client::HttpInferenceClient;
use fv_scan::{build_router, AppState, ScanConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting fv-scan (Crop Scan Ingestion) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration (ENV → TOML → defaults)
    let config = ScanConfig::resolve()?;
    info!("Database: {}", config.database_path.display());
    info!("Upload directory: {}", config.upload_dir.display());
    info!("Classifier: {}", config.classifier_url);

    // Ensure the staging directory exists before the first upload
    std::fs::create_dir_all(&config.upload_dir)?;

    // Initialize database connection pool and tables
    let db_pool = fv_scan::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Inference client with bounded connect + round-trip time
    let classifier = HttpInferenceClient::new(&config.classifier_url, config.classifier_timeout)
        .map_err(|e| anyhow::anyhow!("Failed to build inference client: {}", e))?;

    let port = config.port;
    let state = AppState::new(db_pool, config, Arc::new(classifier));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on http://0.0.0.0:{}", port);
    info!("Health check: http://localhost:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
