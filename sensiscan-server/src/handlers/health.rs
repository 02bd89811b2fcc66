use actix_web::{web, HttpResponse};
use serde::Deserialize;

/// Query shape accepted (and ignored) for parity with the gRPC health
/// check's `service` field; this is an unqualified liveness probe.
#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    #[allow(dead_code)]
    service: Option<String>,
}

pub async fn health(_query: web::Query<HealthQuery>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "SERVING" }))
}
