//! Classifier response normalization
//!
//! Pure mapping from the drifting upstream schema into one canonical
//! diagnosis shape. Never fails; missing fields get fixed sentinels so the
//! rest of the pipeline is isolated from upstream schema changes.

use crate::models::TreatmentInfo;
use crate::services::inference_client::RawDiagnosis;

const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

/// Canonical diagnosis produced from a raw classifier response.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub prediction_class: String,
    pub crop: String,
    pub disease: String,
    pub symptoms: String,
    pub precautions: String,
    pub treatment: TreatmentInfo,
    pub confidence: f64,
}

impl Default for Diagnosis {
    fn default() -> Self {
        Self {
            prediction_class: UNKNOWN.to_string(),
            crop: UNKNOWN.to_string(),
            disease: UNKNOWN.to_string(),
            symptoms: NOT_AVAILABLE.to_string(),
            precautions: NOT_AVAILABLE.to_string(),
            treatment: TreatmentInfo::default(),
            confidence: 0.0,
        }
    }
}

/// Normalize a raw classifier response, filling defaults for every missing
/// field.
pub fn normalize(raw: RawDiagnosis) -> Diagnosis {
    Diagnosis {
        prediction_class: raw.prediction_class.unwrap_or_else(|| UNKNOWN.to_string()),
        crop: raw.crop.unwrap_or_else(|| UNKNOWN.to_string()),
        disease: raw.disease.unwrap_or_else(|| UNKNOWN.to_string()),
        symptoms: raw.symptoms.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        precautions: raw.precautions.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        treatment: raw.treatment.unwrap_or_default(),
        confidence: raw.confidence.unwrap_or(0.0),
    }
}
