//! Rollup statistics over a submitter's scans

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::ScanRecord;

/// Summary statistics computed from a submitter's full scan set.
///
/// Zero-valued (not an error) when the submitter has no scans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub total_scans: u64,
    /// Scans whose disease text classifies as healthy
    pub healthy_scans: u64,
    /// Scans with a non-healthy disease
    pub diseases_found: u64,
    /// Scan count per crop
    pub crop_types: BTreeMap<String, u64>,
    /// Scan count per non-healthy disease
    pub disease_types: BTreeMap<String, u64>,
    /// Mean confidence over all scans, rounded to two decimal places
    pub average_confidence: f64,
    /// Up to five scans, verbatim in input order
    pub recent_scans: Vec<ScanRecord>,
}
