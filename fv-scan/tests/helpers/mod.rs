//! Shared test fixtures: in-memory database, mock classifier, app state

#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fv_scan::services::inference_client::{Classifier, RawDiagnosis, UpstreamError};
use fv_scan::services::upload_staging::UploadedFile;
use fv_scan::{AppState, ScanConfig};

/// Scripted classifier stand-in.
pub enum MockClassifier {
    Respond(RawDiagnosis),
    Timeout,
    Unavailable,
    Reject { status: u16, body: String },
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(
        &self,
        _image_path: &Path,
        _file_name: &str,
        _mime_type: &str,
    ) -> Result<RawDiagnosis, UpstreamError> {
        match self {
            MockClassifier::Respond(raw) => Ok(raw.clone()),
            MockClassifier::Timeout => Err(UpstreamError::Timeout),
            MockClassifier::Unavailable => {
                Err(UpstreamError::Unavailable("connection refused".to_string()))
            }
            MockClassifier::Reject { status, body } => Err(UpstreamError::Rejected {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// In-memory database with fv-scan tables created.
pub async fn test_pool() -> SqlitePool {
    // Single connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    fv_scan::db::init_tables(&pool).await.unwrap();
    pool
}

/// App state over an in-memory database and the given classifier, staging
/// into `upload_dir`.
pub async fn test_state(upload_dir: &Path, classifier: MockClassifier) -> AppState {
    let pool = test_pool().await;
    let config = ScanConfig {
        port: 0,
        database_path: upload_dir.join("test.db"),
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        classifier_url: "http://localhost:8000".to_string(),
        classifier_timeout: Duration::from_secs(30),
    };
    AppState::new(pool, config, Arc::new(classifier))
}

/// Insert a submitter row (normally owned by the user service).
pub async fn seed_submitter(pool: &SqlitePool, submitter_id: &str) {
    sqlx::query("INSERT INTO submitters (submitter_id, name) VALUES (?, ?)")
        .bind(submitter_id)
        .bind("Test Farmer")
        .execute(pool)
        .await
        .unwrap();
}

/// A small valid JPEG-ish upload.
pub fn jpeg_upload() -> UploadedFile {
    UploadedFile {
        file_name: "leaf.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        data: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02],
    }
}

/// A classifier response for a diseased tomato leaf.
pub fn late_blight_response() -> RawDiagnosis {
    RawDiagnosis {
        prediction_class: Some("Tomato_Late_blight".to_string()),
        crop: Some("Tomato".to_string()),
        disease: Some("Late Blight".to_string()),
        symptoms: Some("Dark water-soaked lesions".to_string()),
        treatment: None,
        precautions: None,
        confidence: Some(0.92),
    }
}

/// Number of files currently staged under `dir`.
pub fn staged_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter(|entry| {
            entry
                .as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with("scan-")
        })
        .count()
}

/// Rows in submitter_history for one scan.
pub async fn history_row_count(pool: &SqlitePool, scan_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM submitter_history WHERE scan_id = ?")
        .bind(scan_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
