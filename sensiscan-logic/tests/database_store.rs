use blockscout_service_launcher::database;
use chrono::Utc;
use pretty_assertions::assert_eq;
use sensiscan_entity::sea_orm_active_enums::JobObjectStatus;
use sensiscan_logic::{
    database::Database,
    detectors::{DetectorKind, FindingRecord},
};
use sensiscan_migration::Migrator;
use uuid::Uuid;

#[tokio::test]
#[ignore = "Needs database to run"]
async fn job_lifecycle_tracks_progress_and_findings() {
    let db_guard = database!(Migrator);
    let db = Database::new(db_guard.client());

    let job_id = Uuid::new_v4();
    let now = Utc::now().naive_utc();
    db.create_job(job_id, "reports", Some("2024/"), now)
        .await
        .unwrap();

    db.upsert_object(job_id, "reports", "2024/q1.txt", "etag-1", now)
        .await
        .unwrap();
    db.upsert_object(job_id, "reports", "2024/q2.txt", "etag-2", now)
        .await
        .unwrap();

    let counts = db.count_objects_by_status(job_id).await.unwrap();
    assert_eq!(counts.queued, 2);
    assert_eq!(counts.total(), 2);

    db.set_object_status(
        job_id,
        "reports",
        "2024/q1.txt",
        "etag-1",
        JobObjectStatus::Succeeded,
        None,
        now,
    )
    .await
    .unwrap();

    let counts = db.count_objects_by_status(job_id).await.unwrap();
    assert_eq!(counts.succeeded, 1);
    assert_eq!(counts.queued, 1);

    let findings = vec![FindingRecord {
        job_id,
        bucket: "reports".to_string(),
        key: "2024/q1.txt".to_string(),
        entity_tag: "etag-1".to_string(),
        detector: DetectorKind::Ssn,
        masked_match: "***-**-6789".to_string(),
        context: "Employee SSN: ***-**-6789 on file".to_string(),
        byte_offset: 14,
    }];
    let inserted = db.insert_findings(&findings, now).await.unwrap();
    assert_eq!(inserted, 1);

    // Re-inserting the same finding is a no-op thanks to the unique index.
    let inserted_again = db.insert_findings(&findings, now).await.unwrap();
    assert_eq!(inserted_again, 0);

    assert_eq!(db.count_findings(job_id).await.unwrap(), 1);

    let page = db
        .list_findings(Some("reports"), None, 10, None)
        .await
        .unwrap();
    assert_eq!(page.findings.len(), 1);
    assert_eq!(page.findings[0].masked_match, "***-**-6789");
    assert!(page.next_cursor.is_none());

    let job = db.get_job(job_id).await.unwrap();
    assert_eq!(job.bucket, "reports");
    assert_eq!(job.prefix.as_deref(), Some("2024/"));
}

#[tokio::test]
#[ignore = "Needs database to run"]
async fn get_job_returns_not_found_for_unknown_id() {
    let db_guard = database!(Migrator, "get_job_not_found");
    let db = Database::new(db_guard.client());

    let result = db.get_job(Uuid::new_v4()).await;
    assert!(result.is_err());
}
