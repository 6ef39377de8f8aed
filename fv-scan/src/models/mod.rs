//! Data model for fv-scan

pub mod scan;
pub mod stats;

pub use scan::{HistoryEntry, ScanRecord, ScanSummary, TreatmentInfo};
pub use stats::ScanStats;
