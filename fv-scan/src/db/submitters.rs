//! Submitter directory lookups
//!
//! The `submitters` table is owned by the user service; this pipeline only
//! ever consults it for existence, never mutates it.

use sqlx::SqlitePool;

use crate::error::ScanResult;

/// Report whether a submitter record exists.
pub async fn exists(pool: &SqlitePool, submitter_id: &str) -> ScanResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM submitters WHERE submitter_id = ?")
            .bind(submitter_id)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}
