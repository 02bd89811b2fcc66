use actix_web::web;
use sensiscan_logic::error::ServiceError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::server::AppState;

/// CreateScan request body: `{bucket, prefix?}`.
#[derive(Debug, Deserialize)]
pub struct CreateScanRequest {
    pub bucket: String,
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateScanResponse {
    pub job_id: Uuid,
    pub message: String,
    pub object_count: u64,
    pub enqueued_count: u64,
}

pub async fn create_scan(
    state: web::Data<AppState>,
    request: web::Json<CreateScanRequest>,
) -> Result<web::Json<CreateScanResponse>, ServiceError> {
    let request = request.into_inner();

    let outcome = state
        .ingestor
        .scan(&request.bucket, request.prefix.as_deref())
        .await?;

    Ok(web::Json(CreateScanResponse {
        job_id: outcome.job_id,
        message: "scan started".to_string(),
        object_count: outcome.object_count,
        enqueued_count: outcome.enqueued_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_without_prefix() {
        let parsed: CreateScanRequest =
            serde_json::from_str(r#"{"bucket": "my-bucket"}"#).unwrap();
        assert_eq!(parsed.bucket, "my-bucket");
        assert_eq!(parsed.prefix, None);
    }
}
