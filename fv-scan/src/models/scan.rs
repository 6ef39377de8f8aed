//! Scan record types
//!
//! `ScanRecord` is the canonical stored diagnosis; `HistoryEntry` is the
//! compact per-submitter projection kept alongside it. Wire format is
//! camelCase to match the existing FarmVision API contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::normalizer::Diagnosis;

/// Structured treatment advice from the classifier.
///
/// Every field is optional; an absent upstream `treatment` object becomes
/// the all-`None` default, which serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreatmentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chemical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

impl TreatmentInfo {
    /// True when no treatment field carries any advice.
    pub fn is_empty(&self) -> bool {
        self.chemical.is_none()
            && self.organic.is_none()
            && self.schedule.is_none()
            && self.quantity.is_none()
    }
}

/// Canonical diagnosis record, written once after a successful classifier
/// response and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Primary key, generated at ingestion time
    pub scan_id: String,
    /// Owning submitter; not re-validated after creation
    pub submitter_id: String,
    /// Staged image file name
    pub image_ref: String,
    /// Full path of the staged image, owned by this record until deletion
    pub image_path: String,
    pub prediction_class: String,
    pub crop: String,
    pub disease: String,
    pub symptoms: String,
    pub precautions: String,
    pub treatment: TreatmentInfo,
    /// Classifier confidence in [0, 1]
    pub confidence: f64,
    pub scanned_at: DateTime<Utc>,
    /// Lifecycle tag; always "completed" once written
    pub status: String,
}

impl ScanRecord {
    /// Build a record from a normalized diagnosis.
    pub fn from_diagnosis(
        scan_id: String,
        submitter_id: String,
        image_ref: String,
        image_path: String,
        diagnosis: Diagnosis,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scan_id,
            submitter_id,
            image_ref,
            image_path,
            prediction_class: diagnosis.prediction_class,
            crop: diagnosis.crop,
            disease: diagnosis.disease,
            symptoms: diagnosis.symptoms,
            precautions: diagnosis.precautions,
            treatment: diagnosis.treatment,
            confidence: diagnosis.confidence,
            scanned_at,
            status: "completed".to_string(),
        }
    }

    /// Short human-readable summary for the ingestion response.
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            crop: self.crop.clone(),
            disease: self.disease.clone(),
            confidence: format!("{:.2}%", self.confidence * 100.0),
            treatment_available: !self.treatment.is_empty(),
        }
    }
}

/// Denormalized projection of a [`ScanRecord`] under its submitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub scan_id: String,
    pub prediction_class: String,
    pub crop: String,
    pub disease: String,
    pub confidence: f64,
    pub scanned_at: DateTime<Utc>,
}

impl From<&ScanRecord> for HistoryEntry {
    fn from(record: &ScanRecord) -> Self {
        Self {
            scan_id: record.scan_id.clone(),
            prediction_class: record.prediction_class.clone(),
            crop: record.crop.clone(),
            disease: record.disease.clone(),
            confidence: record.confidence,
            scanned_at: record.scanned_at,
        }
    }
}

/// Human-readable summary returned with a successful ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub crop: String,
    pub disease: String,
    /// Formatted percentage, e.g. "92.00%"
    pub confidence: String,
    pub treatment_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalizer::Diagnosis;

    fn record_with_confidence(confidence: f64) -> ScanRecord {
        ScanRecord::from_diagnosis(
            "scan-1".to_string(),
            "farmer-1".to_string(),
            "scan-123.jpg".to_string(),
            "/tmp/uploads/scan-123.jpg".to_string(),
            Diagnosis {
                confidence,
                ..Diagnosis::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn empty_treatment_serializes_as_empty_object() {
        let json = serde_json::to_value(TreatmentInfo::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn summary_formats_confidence_percentage() {
        let record = record_with_confidence(0.9234);
        let summary = record.summary();
        assert_eq!(summary.confidence, "92.34%");
        assert!(!summary.treatment_available);
    }

    #[test]
    fn summary_reports_treatment_availability() {
        let mut record = record_with_confidence(0.5);
        record.treatment.organic = Some("Neem oil spray".to_string());
        assert!(record.summary().treatment_available);
    }

    #[test]
    fn history_entry_mirrors_record_fields() {
        let record = record_with_confidence(0.75);
        let entry = HistoryEntry::from(&record);
        assert_eq!(entry.scan_id, record.scan_id);
        assert_eq!(entry.crop, record.crop);
        assert_eq!(entry.disease, record.disease);
        assert_eq!(entry.confidence, record.confidence);
        assert_eq!(entry.scanned_at, record.scanned_at);
    }

    #[test]
    fn record_wire_format_is_camel_case() {
        let record = record_with_confidence(0.5);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("scanId").is_some());
        assert!(json.get("submitterId").is_some());
        assert!(json.get("scannedAt").is_some());
        assert_eq!(json.get("status").unwrap(), "completed");
    }
}
