//! Scan API handlers
//!
//! POST /scans runs the full ingestion pipeline; the remaining routes are
//! read/delete operations over already-persisted scans.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::db;
use crate::error::{ScanError, ScanResult};
use crate::models::{ScanRecord, ScanSummary};
use crate::services::scan_pipeline::{ScanPipeline, ScanRequest};
use crate::services::stats_aggregator;
use crate::services::upload_staging::UploadedFile;
use crate::AppState;

/// POST /scans response body
#[derive(Debug, serde::Serialize)]
pub struct ScanResponse {
    pub message: String,
    pub scan: ScanRecord,
    pub summary: ScanSummary,
}

/// POST /scans
///
/// Multipart form: `file` (image) and `submitterId`. Returns 201 with the
/// persisted record and a short summary.
pub async fn upload_and_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ScanResult<(StatusCode, Json<ScanResponse>)> {
    let declared_len = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let limit = state.config.max_upload_bytes;

    let mut submitter_id: Option<String> = None;
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, declared_len, limit))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("submitterId") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ScanError::Internal(format!("Malformed submitterId: {}", e)))?;
                submitter_id = Some(value);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, declared_len, limit))?
                    .to_vec();
                upload = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());
    let outcome = match pipeline
        .run(ScanRequest {
            submitter_id,
            upload,
        })
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            *state.last_error.write().await = Some(err.to_string());
            return Err(err);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ScanResponse {
            message: "Scan completed successfully".to_string(),
            scan: outcome.scan,
            summary: outcome.summary,
        }),
    ))
}

/// A multipart read that fails because the request body outran the router's
/// body limit is an oversize upload, not a malformed one. The exact file size
/// is unknown at that point, so the declared Content-Length stands in for it.
fn multipart_error(err: MultipartError, declared_len: Option<u64>, limit: u64) -> ScanError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ScanError::TooLarge {
            size: declared_len.unwrap_or(0),
            limit,
        }
    } else {
        ScanError::Internal(format!("Malformed multipart body: {}", err))
    }
}

/// GET /scans/:scan_id
pub async fn get_scan(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> ScanResult<Json<ScanRecord>> {
    let record = db::scans::get(&state.db, &scan_id)
        .await?
        .ok_or(ScanError::ScanNotFound(scan_id))?;
    Ok(Json(record))
}

/// GET /scans/submitter/:submitter_id
///
/// All scans for one submitter, most recent first. An empty history is a
/// success, an unknown submitter is not.
pub async fn get_history(
    State(state): State<AppState>,
    Path(submitter_id): Path<String>,
) -> ScanResult<Json<serde_json::Value>> {
    if !db::submitters::exists(&state.db, &submitter_id).await? {
        return Err(ScanError::SubmitterNotFound(submitter_id));
    }

    let scans = db::scans::for_submitter(&state.db, &submitter_id).await?;
    let message = if scans.is_empty() {
        "No scans found"
    } else {
        "Disease history retrieved successfully"
    };

    Ok(Json(json!({
        "message": message,
        "totalScans": scans.len(),
        "scans": scans,
    })))
}

/// GET /scans/submitter/:submitter_id/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Path(submitter_id): Path<String>,
) -> ScanResult<Json<crate::models::ScanStats>> {
    if !db::submitters::exists(&state.db, &submitter_id).await? {
        return Err(ScanError::SubmitterNotFound(submitter_id));
    }

    // Scans arrive most recent first, so recent_scans reports the newest five.
    let scans = db::scans::for_submitter(&state.db, &submitter_id).await?;
    Ok(Json(stats_aggregator::aggregate(&scans)))
}

/// DELETE /scans/:scan_id
///
/// Cascades to the history entry and the staged image file.
pub async fn delete_scan(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> ScanResult<Json<serde_json::Value>> {
    let record = db::scans::delete(&state.db, &scan_id)
        .await?
        .ok_or(ScanError::ScanNotFound(scan_id))?;

    state
        .staging
        .release(std::path::Path::new(&record.image_path))
        .await;

    Ok(Json(json!({ "message": "Scan deleted successfully" })))
}

/// GET /scans (administrative)
pub async fn list_all(State(state): State<AppState>) -> ScanResult<Json<serde_json::Value>> {
    let scans = db::scans::all(&state.db).await?;
    Ok(Json(json!({
        "totalScans": scans.len(),
        "scans": scans,
    })))
}

/// Build scan routes
pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/scans", post(upload_and_scan).get(list_all))
        .route("/scans/:scan_id", get(get_scan).delete(delete_scan))
        .route("/scans/submitter/:submitter_id", get(get_history))
        .route("/scans/submitter/:submitter_id/stats", get(get_stats))
}
