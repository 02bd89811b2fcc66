use actix_web::web;
use chrono::NaiveDateTime;
use sensiscan_logic::{
    database::{derive_progress, JobStatus},
    error::ServiceError,
};
use serde::Serialize;
use uuid::Uuid;

use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatusWire {
    Pending,
    Running,
    Completed,
}

impl From<JobStatus> for JobStatusWire {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => JobStatusWire::Pending,
            JobStatus::Running => JobStatusWire::Running,
            JobStatus::Completed => JobStatusWire::Completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Progress {
    pub total: u64,
    pub completed: u64,
    pub percentage: u64,
}

#[derive(Debug, Serialize)]
pub struct Counts {
    pub queued: u64,
    pub processing: u64,
    pub succeeded: u64,
    pub failed: u64,
}

#[derive(Debug, Serialize)]
pub struct GetJobResponse {
    pub job_id: Uuid,
    pub bucket: String,
    pub prefix: Option<String>,
    pub status: JobStatusWire,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub progress: Progress,
    pub counts: Counts,
    pub findings_count: u64,
}

pub async fn get_job(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<web::Json<GetJobResponse>, ServiceError> {
    let raw_job_id = path.into_inner();
    let job_id = Uuid::parse_str(&raw_job_id)
        .map_err(|_| ServiceError::InvalidRequest(format!("invalid job id: {raw_job_id}")))?;

    let job = state.db.get_job(job_id).await?;
    let counts = state.db.count_objects_by_status(job_id).await?;
    let findings_count = state.db.count_findings(job_id).await?;
    let (progress, status) = derive_progress(counts);

    Ok(web::Json(GetJobResponse {
        job_id: job.job_id,
        bucket: job.bucket,
        prefix: job.prefix,
        status: status.into(),
        created_at: job.created_at,
        updated_at: job.updated_at,
        progress: Progress {
            total: progress.total,
            completed: progress.completed,
            percentage: progress.percentage,
        },
        counts: Counts {
            queued: counts.queued,
            processing: counts.processing,
            succeeded: counts.succeeded,
            failed: counts.failed,
        },
        findings_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_uuid_path_segment() {
        let result = Uuid::parse_str("not-a-uuid");
        assert!(result.is_err());
    }
}
