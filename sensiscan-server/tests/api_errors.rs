use blockscout_service_launcher::{database, test_server};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use sensiscan_migration::Migrator;
use uuid::Uuid;

mod helpers;

#[tokio::test]
#[ignore = "Needs database to run"]
async fn create_scan_rejects_empty_bucket() {
    let db = database!(Migrator);
    let base = helpers::init_server(db.db_url()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(base.join("/api/v1/scan").unwrap())
        .json(&serde_json::json!({ "bucket": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Needs database to run"]
async fn get_job_returns_404_for_unknown_job() {
    let db = database!(Migrator);
    let base = helpers::init_server(db.db_url()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(
            base.join(&format!("/api/v1/jobs/{}", Uuid::new_v4()))
                .unwrap(),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Needs database to run"]
async fn get_job_returns_400_for_malformed_job_id() {
    let db = database!(Migrator);
    let base = helpers::init_server(db.db_url()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(base.join("/api/v1/jobs/not-a-uuid").unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Needs database to run"]
async fn list_findings_rejects_oversized_limit() {
    let db = database!(Migrator);
    let base = helpers::init_server(db.db_url()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(base.join("/api/v1/findings?limit=999999").unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
