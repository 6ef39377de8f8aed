//! Error types for fv-scan
//!
//! One taxonomy for the whole ingestion pipeline, converted to HTTP at the
//! request boundary. Upstream (classifier) failures keep the raw upstream
//! detail so callers can distinguish transient from permanent failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::inference_client::UpstreamError;
use crate::services::upload_staging::StagingError;

/// Service error type
#[derive(Debug, Error)]
pub enum ScanError {
    /// Request carried no file part (400)
    #[error("No file uploaded")]
    MissingFile,

    /// Request carried no submitter id (400)
    #[error("Submitter ID is required")]
    MissingSubmitterId,

    /// Upload is not an accepted image type (400)
    #[error("Only image files are allowed (got {0})")]
    UnsupportedType(String),

    /// Upload exceeds the configured ceiling (413)
    #[error("File too large: {size} bytes (maximum {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// Submitter does not exist (404)
    #[error("Submitter not found: {0}")]
    SubmitterNotFound(String),

    /// Scan does not exist (404)
    #[error("Scan not found: {0}")]
    ScanNotFound(String),

    /// Classifier unreachable (503)
    #[error("Inference service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Classifier exceeded its round-trip bound (504)
    #[error("Inference service took too long to respond")]
    UpstreamTimeout,

    /// Classifier answered with a non-success status (upstream status, else 502)
    #[error("Inference service rejected the image ({status}): {body}")]
    UpstreamRejected { status: u16, body: String },

    /// Any other classifier-side failure (500)
    #[error("Inference call failed: {0}")]
    UpstreamUnknown(String),

    /// Store write failed after a successful classification (500).
    /// The staged image is deliberately preserved on this path.
    #[error("Failed to persist scan: {0}")]
    Persistence(String),

    /// Database error on a read/delete path (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O error (500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// True for failures occurring after classification, where the staged
    /// image must be kept because a canonical record may reference it.
    pub fn preserves_staged_file(&self) -> bool {
        matches!(self, ScanError::Persistence(_))
    }
}

impl From<StagingError> for ScanError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::MissingFile => ScanError::MissingFile,
            StagingError::UnsupportedType(kind) => ScanError::UnsupportedType(kind),
            StagingError::TooLarge { size, limit } => ScanError::TooLarge { size, limit },
            StagingError::Io(e) => ScanError::Io(e),
        }
    }
}

impl From<UpstreamError> for ScanError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unavailable(detail) => ScanError::UpstreamUnavailable(detail),
            UpstreamError::Timeout => ScanError::UpstreamTimeout,
            UpstreamError::Rejected { status, body } => {
                ScanError::UpstreamRejected { status, body }
            }
            UpstreamError::Unknown(detail) => ScanError::UpstreamUnknown(detail),
        }
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ScanError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            ScanError::MissingSubmitterId => (StatusCode::BAD_REQUEST, "MISSING_SUBMITTER_ID"),
            ScanError::UnsupportedType(_) => (StatusCode::BAD_REQUEST, "UNSUPPORTED_TYPE"),
            ScanError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            ScanError::SubmitterNotFound(_) => (StatusCode::NOT_FOUND, "SUBMITTER_NOT_FOUND"),
            ScanError::ScanNotFound(_) => (StatusCode::NOT_FOUND, "SCAN_NOT_FOUND"),
            ScanError::UpstreamUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE")
            }
            ScanError::UpstreamTimeout => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            ScanError::UpstreamRejected { status, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "UPSTREAM_REJECTED",
            ),
            ScanError::UpstreamUnknown(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR")
            }
            ScanError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_FAILURE")
            }
            ScanError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ScanError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            ScanError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers and pipeline stages
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_rejected_uses_upstream_status() {
        let err = ScanError::UpstreamRejected {
            status: 422,
            body: "unsupported image".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_rejected_falls_back_to_bad_gateway() {
        let err = ScanError::UpstreamRejected {
            status: 42,
            body: String::new(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn only_persistence_failures_preserve_the_staged_file() {
        assert!(ScanError::Persistence("disk full".into()).preserves_staged_file());
        assert!(!ScanError::UpstreamTimeout.preserves_staged_file());
        assert!(!ScanError::SubmitterNotFound("ghost".into()).preserves_staged_file());
    }

    #[test]
    fn staging_errors_map_onto_scan_errors() {
        let err: ScanError = StagingError::MissingFile.into();
        assert!(matches!(err, ScanError::MissingFile));

        let err: ScanError = StagingError::TooLarge { size: 20, limit: 10 }.into();
        assert!(matches!(err, ScanError::TooLarge { size: 20, limit: 10 }));
    }
}
