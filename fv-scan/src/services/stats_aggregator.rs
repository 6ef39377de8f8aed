//! Rollup statistics over scan records
//!
//! Pure aggregation: the caller supplies the full set of a submitter's scan
//! records (in whatever order it wants `recent_scans` reported) and gets
//! summary counts plus an average confidence back.

use crate::models::{ScanRecord, ScanStats};

/// Number of scans reported verbatim in `recent_scans`.
const RECENT_SCAN_COUNT: usize = 5;

/// A scan counts as healthy when its disease text contains "healthy",
/// case-insensitively. An exact-sentinel rule ("Healthy Crop") also exists
/// in the field; the substring rule is the one this service implements.
pub fn is_healthy(disease: &str) -> bool {
    disease.to_lowercase().contains("healthy")
}

/// Compute summary statistics over a set of scan records.
///
/// An empty input yields an all-zero [`ScanStats`] rather than an error.
pub fn aggregate(scans: &[ScanRecord]) -> ScanStats {
    let mut stats = ScanStats {
        recent_scans: scans.iter().take(RECENT_SCAN_COUNT).cloned().collect(),
        ..ScanStats::default()
    };

    if scans.is_empty() {
        return stats;
    }

    let mut total_confidence = 0.0;
    for scan in scans {
        stats.total_scans += 1;
        *stats.crop_types.entry(scan.crop.clone()).or_insert(0) += 1;

        if is_healthy(&scan.disease) {
            stats.healthy_scans += 1;
        } else {
            *stats.disease_types.entry(scan.disease.clone()).or_insert(0) += 1;
            stats.diseases_found += 1;
        }

        total_confidence += scan.confidence;
    }

    let mean = total_confidence / scans.len() as f64;
    stats.average_confidence = (mean * 100.0).round() / 100.0;

    stats
}
