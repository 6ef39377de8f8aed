//! Database access for fv-scan
//!
//! SQLite via sqlx. The pool is constructed once at startup and handed to
//! each component explicitly; there is no ambient global handle.

pub mod scans;
pub mod submitters;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create fv-scan tables if they don't exist
///
/// `disease_scans` is the canonical record store; `submitter_history` is the
/// denormalized per-submitter projection; `submitters` belongs to the user
/// service and is only read here.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS disease_scans (
            scan_id TEXT PRIMARY KEY,
            submitter_id TEXT NOT NULL,
            image_ref TEXT NOT NULL,
            image_path TEXT NOT NULL,
            prediction_class TEXT NOT NULL,
            crop TEXT NOT NULL,
            disease TEXT NOT NULL,
            symptoms TEXT NOT NULL,
            precautions TEXT NOT NULL,
            treatment TEXT NOT NULL DEFAULT '{}',
            confidence REAL NOT NULL DEFAULT 0.0,
            scanned_at TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'completed'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submitter_history (
            submitter_id TEXT NOT NULL,
            scan_id TEXT NOT NULL,
            prediction_class TEXT NOT NULL,
            crop TEXT NOT NULL,
            disease TEXT NOT NULL,
            confidence REAL NOT NULL DEFAULT 0.0,
            scanned_at TEXT NOT NULL,
            PRIMARY KEY (submitter_id, scan_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submitters (
            submitter_id TEXT PRIMARY KEY,
            name TEXT,
            created_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (disease_scans, submitter_history, submitters)");

    Ok(())
}
