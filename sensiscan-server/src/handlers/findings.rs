use actix_web::web;
use chrono::NaiveDateTime;
use sensiscan_logic::error::ServiceError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use uuid::Uuid;

use crate::server::AppState;

/// Query params for `ListFindings`: `{bucket?, prefix?, limit?, cursor?}`.
#[derive(Debug, Deserialize)]
pub struct ListFindingsQuery {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub limit: Option<u64>,
    pub cursor: Option<i64>,
}

/// `id` is serialized as a string (not a bare JSON number) to avoid
/// precision loss on 64-bit ids in JS clients.
#[serde_as]
#[derive(Debug, Serialize)]
pub struct FindingWire {
    #[serde_as(as = "DisplayFromStr")]
    pub id: i64,
    pub job_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub detector: String,
    pub masked_match: String,
    pub context: String,
    pub byte_offset: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct ListFindingsResponse {
    pub findings: Vec<FindingWire>,
    pub count: usize,
    pub next_cursor: Option<i64>,
}

pub async fn list_findings(
    state: web::Data<AppState>,
    query: web::Query<ListFindingsQuery>,
) -> Result<web::Json<ListFindingsResponse>, ServiceError> {
    let query = query.into_inner();

    let limit = query.limit.unwrap_or(state.api.default_page_size);
    if limit == 0 || limit > state.api.max_page_size {
        return Err(ServiceError::InvalidRequest(format!(
            "limit must be between 1 and {}",
            state.api.max_page_size
        )));
    }

    let page = state
        .db
        .list_findings(
            query.bucket.as_deref(),
            query.prefix.as_deref(),
            limit,
            query.cursor,
        )
        .await?;

    let findings: Vec<FindingWire> = page
        .findings
        .into_iter()
        .map(|row| FindingWire {
            id: row.id,
            job_id: row.job_id,
            bucket: row.bucket,
            key: row.key,
            detector: row.detector,
            masked_match: row.masked_match,
            context: row.context,
            byte_offset: row.byte_offset,
            created_at: row.created_at,
        })
        .collect();

    Ok(web::Json(ListFindingsResponse {
        count: findings.len(),
        next_cursor: page.next_cursor,
        findings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_deserializes_from_empty_object() {
        let parsed: ListFindingsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.bucket, None);
        assert_eq!(parsed.limit, None);
        assert_eq!(parsed.cursor, None);
    }

    #[test]
    fn finding_id_serializes_as_a_string() {
        let wire = FindingWire {
            id: 9_007_199_254_740_993, // beyond JS's safe integer range
            job_id: Uuid::nil(),
            bucket: "b".to_string(),
            key: "k".to_string(),
            detector: "SSN".to_string(),
            masked_match: "***-**-6789".to_string(),
            context: "...".to_string(),
            byte_offset: 0,
            created_at: chrono::Utc::now().naive_utc(),
        };
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["id"], serde_json::json!("9007199254740993"));
    }
}
