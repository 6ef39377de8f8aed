//! Scan record store
//!
//! Dual-write persistence: the canonical row in `disease_scans` first, then
//! the compact projection in `submitter_history`. The pair is deliberately
//! NOT a transaction — the original store offered no multi-key atomicity and
//! that limitation is preserved rather than hidden. The canonical table is
//! the source of truth; the history index is a cache that the delete path
//! still clears.

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteRow;

use crate::error::{ScanError, ScanResult};
use crate::models::{HistoryEntry, ScanRecord, TreatmentInfo};

/// Persist a scan: canonical record, then history projection.
///
/// The canonical write happens-before the history write. A history failure
/// after a successful canonical write leaves an orphaned canonical row; it
/// is logged loudly and surfaced as a persistence failure.
pub async fn persist(pool: &SqlitePool, record: &ScanRecord) -> ScanResult<()> {
    let treatment = serde_json::to_string(&record.treatment)
        .map_err(|e| ScanError::Persistence(format!("Failed to serialize treatment: {}", e)))?;
    let scanned_at = record.scanned_at.to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO disease_scans (
            scan_id, submitter_id, image_ref, image_path,
            prediction_class, crop, disease, symptoms, precautions,
            treatment, confidence, scanned_at, status
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.scan_id)
    .bind(&record.submitter_id)
    .bind(&record.image_ref)
    .bind(&record.image_path)
    .bind(&record.prediction_class)
    .bind(&record.crop)
    .bind(&record.disease)
    .bind(&record.symptoms)
    .bind(&record.precautions)
    .bind(&treatment)
    .bind(record.confidence)
    .bind(&scanned_at)
    .bind(&record.status)
    .execute(pool)
    .await
    .map_err(|e| ScanError::Persistence(format!("Canonical record write failed: {}", e)))?;

    let entry = HistoryEntry::from(record);
    let history_result = sqlx::query(
        r#"
        INSERT INTO submitter_history (
            submitter_id, scan_id, prediction_class, crop, disease, confidence, scanned_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.submitter_id)
    .bind(&entry.scan_id)
    .bind(&entry.prediction_class)
    .bind(&entry.crop)
    .bind(&entry.disease)
    .bind(entry.confidence)
    .bind(&scanned_at)
    .execute(pool)
    .await;

    if let Err(e) = history_result {
        // Canonical row is committed; the submitter's history index now
        // lacks this scan until a delete clears the pair.
        tracing::error!(
            scan_id = %record.scan_id,
            submitter_id = %record.submitter_id,
            error = %e,
            "History entry write failed after canonical record committed"
        );
        return Err(ScanError::Persistence(format!(
            "History entry write failed: {}",
            e
        )));
    }

    tracing::info!(
        scan_id = %record.scan_id,
        submitter_id = %record.submitter_id,
        "Scan persisted"
    );

    Ok(())
}

/// Fetch a scan by id.
pub async fn get(pool: &SqlitePool, scan_id: &str) -> ScanResult<Option<ScanRecord>> {
    let row = sqlx::query("SELECT * FROM disease_scans WHERE scan_id = ?")
        .bind(scan_id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| record_from_row(&r)).transpose()
}

/// All scans for one submitter, most recent first.
///
/// RFC 3339 timestamps sort lexicographically in chronological order;
/// `scan_id` breaks ties deterministically.
pub async fn for_submitter(pool: &SqlitePool, submitter_id: &str) -> ScanResult<Vec<ScanRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM disease_scans WHERE submitter_id = ? ORDER BY scanned_at DESC, scan_id DESC",
    )
    .bind(submitter_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// All scans in the store, most recent first (administrative listing).
pub async fn all(pool: &SqlitePool) -> ScanResult<Vec<ScanRecord>> {
    let rows = sqlx::query("SELECT * FROM disease_scans ORDER BY scanned_at DESC, scan_id DESC")
        .fetch_all(pool)
        .await?;

    rows.iter().map(record_from_row).collect()
}

/// Delete a scan and its history projection.
///
/// Existence is governed by the canonical row. Returns the deleted record so
/// the caller can release the staged image. The history delete is attempted
/// even when the projection never made it in.
pub async fn delete(pool: &SqlitePool, scan_id: &str) -> ScanResult<Option<ScanRecord>> {
    let Some(record) = get(pool, scan_id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM disease_scans WHERE scan_id = ?")
        .bind(scan_id)
        .execute(pool)
        .await?;

    sqlx::query("DELETE FROM submitter_history WHERE submitter_id = ? AND scan_id = ?")
        .bind(&record.submitter_id)
        .bind(scan_id)
        .execute(pool)
        .await?;

    tracing::info!(scan_id = %scan_id, "Scan deleted");

    Ok(Some(record))
}

fn record_from_row(row: &SqliteRow) -> ScanResult<ScanRecord> {
    let treatment: String = row.get("treatment");
    let treatment: TreatmentInfo = serde_json::from_str(&treatment)
        .map_err(|e| ScanError::Internal(format!("Failed to deserialize treatment: {}", e)))?;

    let scanned_at: String = row.get("scanned_at");
    let scanned_at = chrono::DateTime::parse_from_rfc3339(&scanned_at)
        .map_err(|e| ScanError::Internal(format!("Failed to parse scanned_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    Ok(ScanRecord {
        scan_id: row.get("scan_id"),
        submitter_id: row.get("submitter_id"),
        image_ref: row.get("image_ref"),
        image_path: row.get("image_path"),
        prediction_class: row.get("prediction_class"),
        crop: row.get("crop"),
        disease: row.get("disease"),
        symptoms: row.get("symptoms"),
        precautions: row.get("precautions"),
        treatment,
        confidence: row.get("confidence"),
        scanned_at,
        status: row.get("status"),
    })
}
