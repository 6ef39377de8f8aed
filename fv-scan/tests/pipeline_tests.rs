//! Ingestion pipeline integration tests
//!
//! Exercise the full pipeline against an in-memory database, a temp staging
//! directory, and a scripted classifier — covering the dual-write invariant
//! and the staged-file cleanup policy on every abort path.

mod helpers;

use helpers::*;

use fv_scan::services::inference_client::RawDiagnosis;
use fv_scan::services::scan_pipeline::{ScanPipeline, ScanRequest};
use fv_scan::ScanError;
use sqlx::Row;

fn request(submitter: &str) -> ScanRequest {
    ScanRequest {
        submitter_id: Some(submitter.to_string()),
        upload: Some(jpeg_upload()),
    }
}

#[tokio::test]
async fn successful_ingest_writes_record_and_matching_history_entry() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), MockClassifier::Respond(late_blight_response())).await;
    seed_submitter(&state.db, "farmer-1").await;

    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());
    let outcome = pipeline.run(request("farmer-1")).await.unwrap();

    assert_eq!(outcome.scan.crop, "Tomato");
    assert_eq!(outcome.scan.disease, "Late Blight");
    assert_eq!(outcome.scan.status, "completed");
    assert_eq!(outcome.summary.confidence, "92.00%");
    assert!(!outcome.summary.treatment_available);

    // Canonical record and history entry agree on every shared field
    let row = sqlx::query("SELECT * FROM submitter_history WHERE scan_id = ?")
        .bind(&outcome.scan.scan_id)
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("submitter_id"), "farmer-1");
    assert_eq!(row.get::<String, _>("crop"), outcome.scan.crop);
    assert_eq!(row.get::<String, _>("disease"), outcome.scan.disease);
    assert_eq!(row.get::<f64, _>("confidence"), outcome.scan.confidence);
    assert_eq!(
        row.get::<String, _>("scanned_at"),
        outcome.scan.scanned_at.to_rfc3339()
    );

    // The staged image IS the permanent record; it must survive success
    assert_eq!(staged_file_count(dir.path()), 1);
}

#[tokio::test]
async fn missing_treatment_persists_empty_object_and_na_precautions() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), MockClassifier::Respond(late_blight_response())).await;
    seed_submitter(&state.db, "farmer-1").await;

    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());
    let outcome = pipeline.run(request("farmer-1")).await.unwrap();

    let stored = fv_scan::db::scans::get(&state.db, &outcome.scan.scan_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.treatment.is_empty());
    assert_eq!(stored.precautions, "N/A");
    assert_eq!(stored.symptoms, "Dark water-soaked lesions");
}

#[tokio::test]
async fn unknown_submitter_aborts_and_releases_staged_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), MockClassifier::Respond(late_blight_response())).await;
    // No submitter seeded

    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());
    let err = pipeline.run(request("ghost")).await.unwrap_err();

    assert!(matches!(err, ScanError::SubmitterNotFound(_)));
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn classifier_timeout_aborts_releases_file_and_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), MockClassifier::Timeout).await;
    seed_submitter(&state.db, "farmer-1").await;

    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());
    let err = pipeline.run(request("farmer-1")).await.unwrap_err();

    assert!(matches!(err, ScanError::UpstreamTimeout));
    assert_eq!(staged_file_count(dir.path()), 0);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM disease_scans")
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn classifier_unavailable_and_rejection_map_to_their_error_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), MockClassifier::Unavailable).await;
    seed_submitter(&state.db, "farmer-1").await;
    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());
    let err = pipeline.run(request("farmer-1")).await.unwrap_err();
    assert!(matches!(err, ScanError::UpstreamUnavailable(_)));
    assert_eq!(staged_file_count(dir.path()), 0);

    let state = test_state(
        dir.path(),
        MockClassifier::Reject {
            status: 422,
            body: "not a leaf".to_string(),
        },
    )
    .await;
    seed_submitter(&state.db, "farmer-1").await;
    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());
    let err = pipeline.run(request("farmer-1")).await.unwrap_err();
    match err {
        ScanError::UpstreamRejected { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "not a leaf");
        }
        other => panic!("expected UpstreamRejected, got {:?}", other),
    }
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn missing_file_and_missing_submitter_are_rejected_before_staging() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), MockClassifier::Respond(RawDiagnosis::default())).await;
    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());

    let err = pipeline
        .run(ScanRequest {
            submitter_id: Some("farmer-1".to_string()),
            upload: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::MissingFile));

    let err = pipeline
        .run(ScanRequest {
            submitter_id: None,
            upload: Some(jpeg_upload()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::MissingSubmitterId));

    let err = pipeline
        .run(ScanRequest {
            submitter_id: Some("   ".to_string()),
            upload: Some(jpeg_upload()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::MissingSubmitterId));

    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn persistence_failure_preserves_the_staged_image() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path(), MockClassifier::Respond(late_blight_response())).await;
    seed_submitter(&state.db, "farmer-1").await;

    // Break the second half of the dual write
    sqlx::query("DROP TABLE submitter_history")
        .execute(&state.db)
        .await
        .unwrap();

    let pipeline = ScanPipeline::new(&state.db, &state.staging, state.classifier.as_ref());
    let err = pipeline.run(request("farmer-1")).await.unwrap_err();

    assert!(matches!(err, ScanError::Persistence(_)));
    // Canonical row committed before the failure, and the image it
    // references is deliberately kept
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM disease_scans")
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(staged_file_count(dir.path()), 1);
}
