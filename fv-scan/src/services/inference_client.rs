//! Inference service client
//!
//! Sends a staged image to the external classifier as a single-part
//! multipart POST and maps transport/HTTP outcomes into a typed result.
//! The classifier is an opaque dependency; no retry policy is applied at
//! this layer, a failed call fails the whole request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::models::TreatmentInfo;

/// Classifier-side failure classes.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection refused or classifier otherwise unreachable
    #[error("Inference service unavailable: {0}")]
    Unavailable(String),

    /// Bounded round-trip time exceeded
    #[error("Inference service timed out")]
    Timeout,

    /// Classifier answered with a non-success status
    #[error("Inference service rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Any other transport or decode failure
    #[error("Inference call failed: {0}")]
    Unknown(String),
}

/// Raw classifier response.
///
/// Field names have drifted across classifier versions; every field is
/// optional and the normalizer fills defaults for whatever is missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDiagnosis {
    /// Predicted class label; older classifiers sent `predictionClass`
    #[serde(alias = "predictionClass")]
    pub prediction_class: Option<String>,
    pub crop: Option<String>,
    pub disease: Option<String>,
    pub symptoms: Option<String>,
    pub treatment: Option<TreatmentInfo>,
    pub precautions: Option<String>,
    /// Confidence in [0, 1]
    pub confidence: Option<f64>,
}

/// Image classification seam.
///
/// The production implementation talks HTTP; tests substitute their own.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        image_path: &Path,
        file_name: &str,
        mime_type: &str,
    ) -> Result<RawDiagnosis, UpstreamError>;
}

/// HTTP client for the inference service.
pub struct HttpInferenceClient {
    http_client: reqwest::Client,
    predict_url: String,
}

impl HttpInferenceClient {
    /// Create a client bound to `base_url` with the given round-trip timeout.
    ///
    /// Both the connect phase and the total round trip are bounded.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Unknown(e.to_string()))?;

        Ok(Self {
            http_client,
            predict_url: format!("{}/predict", base_url.trim_end_matches('/')),
        })
    }

    fn map_transport_error(err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_connect() {
            UpstreamError::Unavailable(err.to_string())
        } else {
            UpstreamError::Unknown(err.to_string())
        }
    }
}

#[async_trait]
impl Classifier for HttpInferenceClient {
    async fn classify(
        &self,
        image_path: &Path,
        file_name: &str,
        mime_type: &str,
    ) -> Result<RawDiagnosis, UpstreamError> {
        let image_bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| UpstreamError::Unknown(format!("Failed to read staged image: {}", e)))?;

        let part = reqwest::multipart::Part::bytes(image_bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| UpstreamError::Unknown(format!("Invalid mime type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::debug!(
            url = %self.predict_url,
            file_name = %file_name,
            "Sending image to inference service"
        );

        let response = self
            .http_client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let raw: RawDiagnosis = response
            .json()
            .await
            .map_err(|e| UpstreamError::Unknown(format!("Malformed classifier response: {}", e)))?;

        tracing::info!(
            prediction_class = raw.prediction_class.as_deref().unwrap_or("<missing>"),
            confidence = raw.confidence.unwrap_or(0.0),
            "Inference service responded"
        );

        Ok(raw)
    }
}
