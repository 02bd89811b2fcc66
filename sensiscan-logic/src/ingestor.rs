use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    database::Database,
    error::ServiceError,
    metrics,
    object_store::ObjectStore,
    queue::{Queue, ScanMessage},
};

/// Result of a successful `Ingestor::scan` call, mirroring CreateScan's
/// output shape.
pub struct ScanOutcome {
    pub job_id: Uuid,
    pub object_count: u64,
    pub enqueued_count: u64,
}

/// The ingestion pipeline (component C5): fans a bucket/prefix listing out
/// into `job_object` rows and queue messages for the worker to consume.
pub struct Ingestor {
    db: Database,
    object_store: Arc<ObjectStore>,
    queue: Arc<Queue>,
}

impl Ingestor {
    pub fn new(db: Database, object_store: Arc<ObjectStore>, queue: Arc<Queue>) -> Self {
        Self {
            db,
            object_store,
            queue,
        }
    }

    #[instrument(skip(self), fields(bucket, prefix))]
    pub async fn scan(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<ScanOutcome, ServiceError> {
        if bucket.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "bucket must not be empty".to_string(),
            ));
        }

        let job_id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        self.db.create_job(job_id, bucket, prefix, now).await?;

        let mut object_count = 0u64;
        let mut enqueued_count = 0u64;
        let mut continuation_token: Option<String> = None;
        let mut pending_messages = Vec::new();

        loop {
            let page = self
                .object_store
                .list_objects_page(bucket, prefix, continuation_token.as_deref())
                .await
                .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

            for object in page.objects.into_iter().filter(|o| o.size > 0) {
                object_count += 1;

                if let Err(err) = self
                    .db
                    .upsert_object(job_id, bucket, &object.key, &object.entity_tag, now)
                    .await
                {
                    tracing::warn!(error = %err, key = %object.key, "failed to upsert job object, skipping enqueue");
                    continue;
                }

                pending_messages.push(ScanMessage {
                    job_id,
                    bucket: bucket.to_string(),
                    key: object.key,
                    etag: object.entity_tag,
                });
            }

            if page.continuation_token.is_none() {
                break;
            }
            continuation_token = page.continuation_token;
        }

        match self.queue.send_message_batch(&pending_messages).await {
            Ok(sent) => enqueued_count += sent as u64,
            Err(err) => {
                tracing::error!(error = %err, %job_id, "failed to publish some or all queue messages");
            }
        }

        metrics::OBJECTS_INGESTED.inc_by(object_count);

        Ok(ScanOutcome {
            job_id,
            object_count,
            enqueued_count,
        })
    }
}
