use std::time::Duration;

use aws_sdk_sqs as sqs;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct QueueSettings {
    pub queue_url: String,
    pub region: String,
    pub endpoint: Option<String>,
    #[serde(default = "default_wait_time_seconds")]
    pub wait_time_seconds: i32,
    #[serde(default = "default_visibility_timeout_seconds")]
    pub visibility_timeout_seconds: i32,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_wait_time_seconds() -> i32 {
    20
}

fn default_visibility_timeout_seconds() -> i32 {
    300
}

fn default_max_batch_size() -> usize {
    10
}

/// Wire-level body for one scan work item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanMessage {
    pub job_id: Uuid,
    pub bucket: String,
    pub key: String,
    pub etag: String,
}

/// A message received from the queue, carrying the handle needed to delete
/// it once processing is complete.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub receipt_handle: String,
    pub body: String,
}

#[derive(thiserror::Error, Debug)]
pub enum QueueError {
    #[error("malformed message body: {0}")]
    MalformedBody(#[source] serde_json::Error),
    #[error("transport error talking to queue: {0}")]
    Transport(#[source] anyhow::Error),
}

/// Thin wrapper over `aws-sdk-sqs`, mirroring the construction style of
/// `ObjectStore` (region + optional endpoint override for local testing).
#[derive(Clone, Debug)]
pub struct Queue {
    client: sqs::Client,
    queue_url: String,
    wait_time_seconds: i32,
    visibility_timeout_seconds: i32,
    max_batch_size: usize,
}

impl Queue {
    pub async fn new(settings: QueueSettings) -> anyhow::Result<Self> {
        let region = aws_sdk_sqs::config::Region::new(settings.region.clone());
        let timeout_config = aws_config::timeout::TimeoutConfig::builder()
            .operation_timeout(DEFAULT_OPERATION_TIMEOUT)
            .build();
        let mut config_builder = sqs::Config::builder()
            .region(Some(region))
            .timeout_config(timeout_config);
        if let Some(endpoint) = &settings.endpoint {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        let client = sqs::Client::from_conf(config_builder.build());

        Ok(Queue {
            client,
            queue_url: settings.queue_url,
            wait_time_seconds: settings.wait_time_seconds,
            visibility_timeout_seconds: settings.visibility_timeout_seconds,
            max_batch_size: settings.max_batch_size,
        })
    }

    /// Long-polls for at most one message.
    pub async fn receive_message(&self) -> Result<Option<ReceivedMessage>, QueueError> {
        let response = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(self.wait_time_seconds)
            .visibility_timeout(self.visibility_timeout_seconds)
            .send()
            .await
            .map_err(|e| QueueError::Transport(anyhow::anyhow!(e)))?;

        let message = response.messages.unwrap_or_default().into_iter().next();
        Ok(message.and_then(|m| {
            let receipt_handle = m.receipt_handle?;
            let body = m.body?;
            Some(ReceivedMessage {
                receipt_handle,
                body,
            })
        }))
    }

    pub async fn delete_message(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Transport(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Publishes `messages` in batches of up to `max_batch_size` (capped
    /// at 10 entries per SQS batch limit). Returns the number of entries the queue confirmed
    /// as successfully enqueued; per-entry failures are logged and skipped
    /// rather than aborting the whole batch.
    pub async fn send_message_batch(&self, messages: &[ScanMessage]) -> Result<usize, QueueError> {
        let mut enqueued = 0usize;

        for (batch_index, chunk) in messages.chunks(self.max_batch_size).enumerate() {
            let entries: Vec<_> = chunk
                .iter()
                .enumerate()
                .map(|(i, message)| {
                    let body = serde_json::to_string(message)
                        .expect("ScanMessage serialization is infallible");
                    sqs::types::SendMessageBatchRequestEntry::builder()
                        .id(format!("{batch_index}-{i}"))
                        .message_body(body)
                        .build()
                        .expect("batch entry requires id and body, both set above")
                })
                .collect();

            let response = self
                .client
                .send_message_batch()
                .queue_url(&self.queue_url)
                .set_entries(Some(entries))
                .send()
                .await
                .map_err(|e| QueueError::Transport(anyhow::anyhow!(e)))?;

            enqueued += response.successful().len();
            for failed in response.failed() {
                tracing::warn!(
                    message_id = failed.id(),
                    code = failed.code(),
                    "queue rejected one batch entry"
                );
            }
        }

        Ok(enqueued)
    }
}

impl ScanMessage {
    pub fn parse(body: &str) -> Result<Self, QueueError> {
        serde_json::from_str(body).map_err(QueueError::MalformedBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_message_round_trips_through_json() {
        let message = ScanMessage {
            job_id: Uuid::nil(),
            bucket: "b".into(),
            key: "k".into(),
            etag: "etag".into(),
        };
        let body = serde_json::to_string(&message).unwrap();
        let parsed = ScanMessage::parse(&body).unwrap();
        assert_eq!(message, parsed);
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert!(ScanMessage::parse("not json").is_err());
    }
}
