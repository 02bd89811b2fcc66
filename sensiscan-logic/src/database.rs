use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use sensiscan_entity::{
    findings, job_objects, jobs, sea_orm_active_enums::JobObjectStatus,
};
use uuid::Uuid;

use crate::{
    bulk::batched_upsert,
    detectors::FindingRecord,
    error::ServiceError,
};

/// Zero-filled counts over the four `JobObject` states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub queued: u64,
    pub processing: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.queued + self.processing + self.succeeded + self.failed
    }
}

/// A page of `list_findings` results.
pub struct FindingsPage {
    pub findings: Vec<findings::Model>,
    pub next_cursor: Option<i64>,
}

/// Store adapter (component C3): one inherent method per operation named in
/// one inherent method per store operation, holding a shared, bounded
/// `DatabaseConnection` pool.
#[derive(Clone)]
pub struct Database {
    db: Arc<DatabaseConnection>,
}

impl Database {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_job(
        &self,
        job_id: Uuid,
        bucket: &str,
        prefix: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<(), ServiceError> {
        let model = jobs::ActiveModel {
            job_id: Set(job_id),
            bucket: Set(bucket.to_string()),
            prefix: Set(prefix.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        jobs::Entity::insert(model)
            .exec(self.db.as_ref())
            .await
            .inspect_err(|e| tracing::error!(err =? e, %job_id, "failed to insert job"))?;

        Ok(())
    }

    pub async fn upsert_object(
        &self,
        job_id: Uuid,
        bucket: &str,
        key: &str,
        entity_tag: &str,
        now: NaiveDateTime,
    ) -> Result<(), ServiceError> {
        let model = job_objects::ActiveModel {
            job_id: Set(job_id),
            bucket: Set(bucket.to_string()),
            key: Set(key.to_string()),
            entity_tag: Set(entity_tag.to_string()),
            status: Set(JobObjectStatus::Queued),
            last_error: Set(None),
            updated_at: Set(now),
        };

        job_objects::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    job_objects::Column::JobId,
                    job_objects::Column::Bucket,
                    job_objects::Column::Key,
                    job_objects::Column::EntityTag,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(self.db.as_ref())
            .await
            .inspect_err(|e| tracing::error!(err =? e, %job_id, key, "failed to upsert job object"))?;

        Ok(())
    }

    pub async fn set_object_status(
        &self,
        job_id: Uuid,
        bucket: &str,
        key: &str,
        entity_tag: &str,
        status: JobObjectStatus,
        error: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<(), ServiceError> {
        let model = job_objects::ActiveModel {
            job_id: Set(job_id),
            bucket: Set(bucket.to_string()),
            key: Set(key.to_string()),
            entity_tag: Set(entity_tag.to_string()),
            status: Set(status),
            last_error: Set(error.map(str::to_string)),
            updated_at: Set(now),
        };

        job_objects::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    job_objects::Column::JobId,
                    job_objects::Column::Bucket,
                    job_objects::Column::Key,
                    job_objects::Column::EntityTag,
                ])
                .update_columns([
                    job_objects::Column::Status,
                    job_objects::Column::LastError,
                    job_objects::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(self.db.as_ref())
            .await
            .inspect_err(|e| tracing::error!(err =? e, %job_id, key, "failed to update job object status"))?;

        Ok(())
    }

    /// Bulk-inserts finding records, silently dropping duplicates via the
    /// unique index on (bucket, key, entity_tag, detector, byte_offset).
    /// Returns the number of rows actually inserted.
    pub async fn insert_findings(
        &self,
        records: &[FindingRecord],
        now: NaiveDateTime,
    ) -> Result<u64, ServiceError> {
        if records.is_empty() {
            return Ok(0);
        }

        let models: Vec<findings::ActiveModel> = records
            .iter()
            .map(|record| findings::ActiveModel {
                id: sea_orm::ActiveValue::NotSet,
                job_id: Set(record.job_id),
                bucket: Set(record.bucket.clone()),
                key: Set(record.key.clone()),
                entity_tag: Set(record.entity_tag.clone()),
                detector: Set(record.detector.as_str().to_string()),
                masked_match: Set(record.masked_match.clone()),
                context: Set(record.context.clone()),
                byte_offset: Set(record.byte_offset),
                created_at: Set(now),
            })
            .collect();

        let before = self.count_findings(records[0].job_id).await?;

        let on_conflict = OnConflict::columns([
            findings::Column::Bucket,
            findings::Column::Key,
            findings::Column::EntityTag,
            findings::Column::Detector,
            findings::Column::ByteOffset,
        ])
        .do_nothing()
        .to_owned();

        batched_upsert(self.db.as_ref(), &models, on_conflict)
            .await
            .inspect_err(|e| tracing::error!(err =? e, "failed to bulk-insert findings"))?;

        let after = self.count_findings(records[0].job_id).await?;
        Ok(after.saturating_sub(before))
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<jobs::Model, ServiceError> {
        jobs::Entity::find_by_id(job_id)
            .one(self.db.as_ref())
            .await
            .inspect_err(|e| tracing::error!(err =? e, %job_id, "failed to fetch job"))?
            .ok_or_else(|| ServiceError::NotFound(format!("job {job_id} not found")))
    }

    pub async fn count_objects_by_status(
        &self,
        job_id: Uuid,
    ) -> Result<StatusCounts, ServiceError> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct StatusCount {
            status: JobObjectStatus,
            count: i64,
        }

        let rows: Vec<StatusCount> = job_objects::Entity::find()
            .filter(job_objects::Column::JobId.eq(job_id))
            .select_only()
            .column(job_objects::Column::Status)
            .column_as(job_objects::Column::JobId.count(), "count")
            .group_by(job_objects::Column::Status)
            .into_model()
            .all(self.db.as_ref())
            .await
            .inspect_err(|e| tracing::error!(err =? e, %job_id, "failed to count job objects by status"))?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let n = row.count.max(0) as u64;
            match row.status {
                JobObjectStatus::Queued => counts.queued = n,
                JobObjectStatus::Processing => counts.processing = n,
                JobObjectStatus::Succeeded => counts.succeeded = n,
                JobObjectStatus::Failed => counts.failed = n,
            }
        }

        Ok(counts)
    }

    pub async fn count_findings(&self, job_id: Uuid) -> Result<u64, ServiceError> {
        findings::Entity::find()
            .filter(findings::Column::JobId.eq(job_id))
            .count(self.db.as_ref())
            .await
            .inspect_err(|e| tracing::error!(err =? e, %job_id, "failed to count findings"))
            .map_err(ServiceError::from)
    }

    pub async fn list_findings(
        &self,
        bucket: Option<&str>,
        prefix: Option<&str>,
        limit: u64,
        cursor: Option<i64>,
    ) -> Result<FindingsPage, ServiceError> {
        let mut query = findings::Entity::find().order_by_asc(findings::Column::Id);

        if let Some(cursor) = cursor {
            query = query.filter(findings::Column::Id.gt(cursor));
        }
        if let Some(bucket) = bucket {
            query = query.filter(findings::Column::Bucket.eq(bucket));
        }
        if let Some(prefix) = prefix {
            query = query.filter(findings::Column::Key.starts_with(prefix));
        }

        let rows = query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .inspect_err(|e| tracing::error!(err =? e, "failed to list findings"))?;

        let next_cursor = if rows.len() as u64 == limit {
            rows.last().map(|row| row.id)
        } else {
            None
        };

        Ok(FindingsPage {
            findings: rows,
            next_cursor,
        })
    }
}

/// Derived job progress, used by GetJob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobProgress {
    pub total: u64,
    pub completed: u64,
    pub percentage: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
}

pub fn derive_progress(counts: StatusCounts) -> (JobProgress, JobStatus) {
    let total = counts.total();
    let completed = counts.succeeded + counts.failed;
    let percentage = if total > 0 {
        (100 * completed + total / 2) / total
    } else {
        0
    };

    let status = if total > 0 && completed == total {
        JobStatus::Completed
    } else if total > 0 && counts.queued == total {
        JobStatus::Pending
    } else {
        JobStatus::Running
    };

    (
        JobProgress {
            total,
            completed,
            percentage,
        },
        status,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCounts { queued: 0, processing: 0, succeeded: 3, failed: 0 }, JobStatus::Completed, 100)]
    #[case(StatusCounts { queued: 3, processing: 0, succeeded: 0, failed: 0 }, JobStatus::Pending, 0)]
    #[case(StatusCounts { queued: 1, processing: 1, succeeded: 1, failed: 0 }, JobStatus::Running, 33)]
    #[case(StatusCounts::default(), JobStatus::Running, 0)]
    fn derives_expected_status_and_percentage(
        #[case] counts: StatusCounts,
        #[case] expected_status: JobStatus,
        #[case] expected_percentage: u64,
    ) {
        let (progress, status) = derive_progress(counts);
        assert_eq!(status, expected_status);
        assert_eq!(progress.percentage, expected_percentage);
    }
}
