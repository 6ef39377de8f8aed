//! Upload staging
//!
//! Validates an uploaded image and writes it to the staging directory under
//! a collision-resistant name. Staged files are owned by the request until
//! the scan is persisted; every failure path before persistence must call
//! [`UploadStaging::release`].

use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Image types accepted for staging (extension and mime subtype).
const ALLOWED_IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Staging failures; all are caller errors except `Io`.
#[derive(Debug, Error)]
pub enum StagingError {
    /// Request carried no file part
    #[error("No file uploaded")]
    MissingFile,

    /// Declared content type / extension is not an accepted image type
    #[error("Only image files are allowed (got {0})")]
    UnsupportedType(String),

    /// Upload exceeds the configured size ceiling
    #[error("File too large: {size} bytes (maximum {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// Failed to write the staged file
    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded file as received from the multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A staged upload on disk.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Generated file name (the scan record's `image_ref`)
    pub file_name: String,
    /// Full path under the staging directory
    pub path: PathBuf,
}

/// Writes validated uploads into the staging directory.
#[derive(Debug, Clone)]
pub struct UploadStaging {
    upload_dir: PathBuf,
    max_bytes: u64,
}

impl UploadStaging {
    pub fn new(upload_dir: PathBuf, max_bytes: u64) -> Self {
        Self {
            upload_dir,
            max_bytes,
        }
    }

    /// Create the staging directory if it does not exist yet.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }

    /// Validate and stage an upload.
    ///
    /// Both the filename extension and the declared mime subtype must be an
    /// accepted image type. The staged name is derived from the current time
    /// plus a random component; uniqueness is probabilistic, not coordinated.
    pub async fn stage(&self, upload: Option<UploadedFile>) -> Result<StagedFile, StagingError> {
        let upload = upload.ok_or(StagingError::MissingFile)?;

        let extension = Self::extension_of(&upload.file_name);
        let subtype = upload
            .content_type
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let extension_ok = extension
            .as_deref()
            .is_some_and(|ext| ALLOWED_IMAGE_TYPES.contains(&ext));
        if !extension_ok || !ALLOWED_IMAGE_TYPES.contains(&subtype.as_str()) {
            return Err(StagingError::UnsupportedType(upload.content_type));
        }

        let size = upload.data.len() as u64;
        if size > self.max_bytes {
            return Err(StagingError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let file_name = format!(
            "scan-{}-{}.{}",
            Utc::now().timestamp_millis(),
            suffix,
            extension.unwrap_or_default()
        );
        let path = self.upload_dir.join(&file_name);

        tokio::fs::write(&path, &upload.data).await?;

        tracing::debug!(
            file = %path.display(),
            bytes = size,
            "Staged upload"
        );

        Ok(StagedFile { file_name, path })
    }

    /// Remove a staged file.
    ///
    /// Idempotent and best-effort: a missing file is success, any other
    /// failure is logged and swallowed. Cleanup never fails a request.
    pub async fn release(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(file = %path.display(), "Released staged file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to release staged file");
            }
        }
    }

    fn extension_of(file_name: &str) -> Option<String> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}
