use std::sync::Arc;

use chrono::Utc;
use sensiscan_entity::sea_orm_active_enums::JobObjectStatus;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    database::Database,
    detectors::{self, ScanTarget},
    metrics,
    object_store::{has_supported_extension, ObjectStore},
    queue::{Queue, ScanMessage},
};

/// In-process polling concurrency is always 1; throughput comes from
/// running more worker replicas, never more than one in-flight message
/// within a process.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WorkerSettings {
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: u64,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_shutdown_grace_seconds() -> u64 {
    2
}

fn default_pool_size() -> u32 {
    10
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
            pool_size: default_pool_size(),
        }
    }
}

/// The worker loop (component C4): one cooperative consumer per process,
/// polling the queue and driving each message through fetch -> scan ->
/// persist -> acknowledge.
pub struct Worker {
    db: Database,
    object_store: ObjectStore,
    queue: Arc<Queue>,
}

impl Worker {
    pub fn new(db: Database, object_store: ObjectStore, queue: Arc<Queue>) -> Self {
        Self {
            db,
            object_store,
            queue,
        }
    }

    /// Runs until `cancellation` fires, checking it between messages only.
    #[instrument(name = "worker", skip_all, level = "info")]
    pub async fn run(&self, cancellation: CancellationToken) {
        loop {
            if cancellation.is_cancelled() {
                tracing::info!("shutdown requested, exiting worker loop");
                return;
            }

            match self.queue.receive_message().await {
                Ok(Some(message)) => {
                    self.handle_message(&message.body, &message.receipt_handle)
                        .await;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(error = %err, "failed to receive message from queue");
                }
            }
        }
    }

    async fn handle_message(&self, body: &str, receipt_handle: &str) {
        let message = match ScanMessage::parse(body) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "dropping unparseable message");
                self.ack(receipt_handle).await;
                return;
            }
        };

        let now = Utc::now().naive_utc();

        if let Err(err) = self
            .db
            .set_object_status(
                message.job_id,
                &message.bucket,
                &message.key,
                &message.etag,
                JobObjectStatus::Processing,
                None,
                now,
            )
            .await
        {
            tracing::warn!(error = %err, job_id = %message.job_id, "failed to mark job object processing");
        }

        if !has_supported_extension(&message.key) {
            self.finish_unsupported(&message).await;
            self.ack(receipt_handle).await;
            return;
        }

        let fetch_timer = metrics::FETCH_DURATION_SECONDS.start_timer();
        let fetched = self.object_store.fetch(&message.bucket, &message.key).await;
        fetch_timer.observe_duration();

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                self.finish_failed(&message, &err.to_string()).await;
                metrics::MESSAGES_FAILED.inc();
                // do not acknowledge: the queue redelivers after the
                // visibility timeout expires.
                return;
            }
        };

        let entity_tag = if message.etag.is_empty() {
            fetched.entity_tag.clone()
        } else {
            message.etag.clone()
        };

        let target = ScanTarget {
            job_id: message.job_id,
            bucket: message.bucket.clone(),
            key: message.key.clone(),
            entity_tag: entity_tag.clone(),
        };

        let scan_timer = metrics::SCAN_DURATION_SECONDS.start_timer();
        let findings = detectors::scan(&fetched.text, &target);
        scan_timer.observe_duration();

        if !findings.is_empty() {
            let persist_timer = metrics::PERSIST_DURATION_SECONDS.start_timer();
            let insert_result = self.db.insert_findings(&findings, Utc::now().naive_utc()).await;
            persist_timer.observe_duration();

            match insert_result {
                Ok(inserted) => {
                    for finding in &findings {
                        metrics::FINDINGS_INSERTED
                            .with_label_values(&[finding.detector.as_str()])
                            .inc();
                    }
                    tracing::info!(
                        job_id = %message.job_id,
                        key = %message.key,
                        inserted,
                        candidates = findings.len(),
                        "persisted findings"
                    );
                }
                Err(err) => {
                    self.finish_failed(&message, &err.to_string()).await;
                    metrics::MESSAGES_FAILED.inc();
                    return;
                }
            }
        }

        let now = Utc::now().naive_utc();
        if let Err(err) = self
            .db
            .set_object_status(
                message.job_id,
                &message.bucket,
                &message.key,
                &entity_tag,
                JobObjectStatus::Succeeded,
                None,
                now,
            )
            .await
        {
            tracing::warn!(error = %err, job_id = %message.job_id, "failed to mark job object succeeded");
        }

        metrics::MESSAGES_PROCESSED.inc();
        self.ack(receipt_handle).await;
    }

    async fn finish_unsupported(&self, message: &ScanMessage) {
        let now = Utc::now().naive_utc();
        if let Err(err) = self
            .db
            .set_object_status(
                message.job_id,
                &message.bucket,
                &message.key,
                &message.etag,
                JobObjectStatus::Succeeded,
                Some("Unsupported file type - skipped"),
                now,
            )
            .await
        {
            tracing::warn!(error = %err, job_id = %message.job_id, "failed to mark unsupported job object");
        }
        metrics::MESSAGES_PROCESSED.inc();
    }

    async fn finish_failed(&self, message: &ScanMessage, error_message: &str) {
        let now = Utc::now().naive_utc();
        if let Err(err) = self
            .db
            .set_object_status(
                message.job_id,
                &message.bucket,
                &message.key,
                &message.etag,
                JobObjectStatus::Failed,
                Some(error_message),
                now,
            )
            .await
        {
            tracing::warn!(error = %err, job_id = %message.job_id, "failed to mark job object failed");
        }
    }

    async fn ack(&self, receipt_handle: &str) {
        if let Err(err) = self.queue.delete_message(receipt_handle).await {
            tracing::error!(error = %err, "failed to acknowledge message");
        }
    }
}
