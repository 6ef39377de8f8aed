//! Scan ingestion pipeline
//!
//! Orchestrates one upload end to end:
//! Received → Validated → Staged → Identified → Classified → Normalized →
//! Persisted, aborting at the first failed transition. Cleanup of the staged
//! file is centralized here: every abort after staging releases it, except a
//! persistence failure, where the image is deliberately kept because a
//! partially written canonical record may already reference it.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;
use crate::error::{ScanError, ScanResult};
use crate::models::{ScanRecord, ScanSummary};
use crate::services::inference_client::Classifier;
use crate::services::normalizer;
use crate::services::upload_staging::{StagedFile, UploadStaging, UploadedFile};

/// One ingestion request, as decoded from the multipart form.
#[derive(Debug)]
pub struct ScanRequest {
    pub submitter_id: Option<String>,
    pub upload: Option<UploadedFile>,
}

/// Successful ingestion result.
#[derive(Debug)]
pub struct ScanOutcome {
    pub scan: ScanRecord,
    pub summary: ScanSummary,
}

/// Pipeline over explicitly injected collaborators. Constructed per request;
/// holds no state of its own.
pub struct ScanPipeline<'a> {
    db: &'a SqlitePool,
    staging: &'a UploadStaging,
    classifier: &'a dyn Classifier,
}

impl<'a> ScanPipeline<'a> {
    pub fn new(db: &'a SqlitePool, staging: &'a UploadStaging, classifier: &'a dyn Classifier) -> Self {
        Self {
            db,
            staging,
            classifier,
        }
    }

    /// Run the full ingestion pipeline for one request.
    pub async fn run(&self, request: ScanRequest) -> ScanResult<ScanOutcome> {
        // Received → Validated
        let submitter_id = match request.submitter_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(ScanError::MissingSubmitterId),
        };
        let upload = request.upload.ok_or(ScanError::MissingFile)?;
        let original_name = upload.file_name.clone();
        let content_type = upload.content_type.clone();

        // Validated → Staged
        let staged = self.staging.stage(Some(upload)).await?;

        // Remaining transitions; on abort, release the staged file unless
        // the failure happened during persistence.
        match self
            .run_staged(&submitter_id, &staged, &original_name, &content_type)
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if err.preserves_staged_file() {
                    tracing::warn!(
                        file = %staged.path.display(),
                        "Keeping staged image after persistence failure"
                    );
                } else {
                    self.staging.release(&staged.path).await;
                }
                Err(err)
            }
        }
    }

    async fn run_staged(
        &self,
        submitter_id: &str,
        staged: &StagedFile,
        original_name: &str,
        content_type: &str,
    ) -> ScanResult<ScanOutcome> {
        // Staged → Identified
        if !db::submitters::exists(self.db, submitter_id).await? {
            return Err(ScanError::SubmitterNotFound(submitter_id.to_string()));
        }

        // Identified → Classified
        tracing::info!(
            file = %staged.file_name,
            submitter_id = %submitter_id,
            "Sending image to inference service"
        );
        let raw = self
            .classifier
            .classify(&staged.path, original_name, content_type)
            .await?;

        // Classified → Normalized (never fails, only fills defaults)
        let diagnosis = normalizer::normalize(raw);

        // Normalized → Persisted
        let record = ScanRecord::from_diagnosis(
            Uuid::new_v4().to_string(),
            submitter_id.to_string(),
            staged.file_name.clone(),
            staged.path.display().to_string(),
            diagnosis,
            chrono::Utc::now(),
        );
        db::scans::persist(self.db, &record).await?;

        // Persisted → Responded
        let summary = record.summary();
        Ok(ScanOutcome {
            scan: record,
            summary,
        })
    }
}
