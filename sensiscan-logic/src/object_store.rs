use std::time::Duration;

use aws_sdk_s3::{self as s3, config::Region};
use serde::Deserialize;

/// Objects larger than this are rejected before the body is ever downloaded.
pub const MAX_OBJECT_BYTES: i64 = 100 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "csv", "json", "log"];

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ObjectStoreSettings {
    pub region: String,
    /// Overrides the endpoint for S3-compatible stores (MinIO, LocalStack).
    /// Left unset to talk to real AWS S3.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default = "default_max_object_bytes")]
    pub max_object_bytes: i64,
}

fn default_max_object_bytes() -> i64 {
    MAX_OBJECT_BYTES
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },
    #[error("object too large: {size} bytes exceeds cap of {cap} bytes")]
    TooLarge { size: i64, cap: i64 },
    #[error("object extension not supported: {key}")]
    UnsupportedExtension { key: String },
    #[error("transport error talking to object store: {0}")]
    Transport(#[source] anyhow::Error),
    #[error("failed to decode object body: {0}")]
    Decode(#[source] anyhow::Error),
}

/// A fetched object's metadata and decoded text content.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub entity_tag: String,
    pub size: i64,
    pub text: String,
}

/// A single page of a bucket listing.
#[derive(Debug, Clone)]
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub entity_tag: String,
}

/// Thin wrapper over `aws-sdk-s3` (component C2): probes object metadata,
/// enforces the size cap before downloading, and decodes bodies to text.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    client: s3::Client,
    max_object_bytes: i64,
}

impl ObjectStore {
    pub async fn new(settings: ObjectStoreSettings) -> anyhow::Result<Self> {
        let region = Region::new(settings.region.clone());
        let timeout_config = aws_config::timeout::TimeoutConfig::builder()
            .operation_timeout(DEFAULT_OPERATION_TIMEOUT)
            .build();
        let mut config_builder = s3::Config::builder()
            .region(Some(region))
            .timeout_config(timeout_config)
            .force_path_style(settings.force_path_style);

        if let Some(endpoint) = &settings.endpoint {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            let credentials = aws_credential_types::Credentials::from_keys(
                access_key_id,
                secret_access_key,
                None,
            );
            config_builder = config_builder.credentials_provider(credentials);
        }

        let client = s3::Client::from_conf(config_builder.build());

        Ok(ObjectStore {
            client,
            max_object_bytes: settings.max_object_bytes,
        })
    }

    /// Lists one page of objects under `prefix`, following continuation
    /// tokens across pages.
    pub async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, FetchError> {
        let mut request = self.client.list_objects_v2().bucket(bucket).max_keys(1000);
        if let Some(prefix) = prefix {
            request = request.prefix(prefix);
        }
        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(anyhow::anyhow!(e)))?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?.to_string();
                let size = obj.size().unwrap_or(0);
                let entity_tag = obj.e_tag().map(strip_etag_quotes).unwrap_or_default();
                Some(ObjectSummary { key, size, entity_tag })
            })
            .collect();

        let continuation_token = response.next_continuation_token().map(str::to_string);

        Ok(ObjectPage {
            objects,
            continuation_token,
        })
    }

    /// Fetches and decodes an object, enforcing the size cap via `head_object`
    /// before ever downloading the body.
    pub async fn fetch(&self, bucket: &str, key: &str) -> Result<FetchedObject, FetchError> {
        if !has_supported_extension(key) {
            return Err(FetchError::UnsupportedExtension {
                key: key.to_string(),
            });
        }

        let head = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_not_found(e, bucket, key))?;

        let size = head.content_length().unwrap_or(0);
        if size > self.max_object_bytes {
            return Err(FetchError::TooLarge {
                size,
                cap: self.max_object_bytes,
            });
        }

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_not_found(e, bucket, key))?;

        let entity_tag = response
            .e_tag()
            .map(strip_etag_quotes)
            .unwrap_or_default();

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| FetchError::Decode(anyhow::anyhow!(e)))?
            .into_bytes();

        let text = String::from_utf8_lossy(&body).into_owned();

        Ok(FetchedObject {
            entity_tag,
            size,
            text,
        })
    }
}

fn map_not_found<E>(error: E, bucket: &str, key: &str) -> FetchError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = error.to_string();
    if message.contains("NotFound") || message.contains("NoSuchKey") {
        FetchError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    } else {
        FetchError::Transport(anyhow::anyhow!(error))
    }
}

fn strip_etag_quotes(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

pub fn has_supported_extension(key: &str) -> bool {
    key.rsplit_once('.')
        .map(|(_, ext)| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes_from_etag() {
        assert_eq!(strip_etag_quotes("\"abc123\""), "abc123");
        assert_eq!(strip_etag_quotes("abc123"), "abc123");
    }

    #[test]
    fn accepts_supported_extensions_case_insensitively() {
        assert!(has_supported_extension("reports/q1.TXT"));
        assert!(has_supported_extension("a/b/c.csv"));
        assert!(has_supported_extension("data.json"));
        assert!(has_supported_extension("app.log"));
    }

    #[test]
    fn rejects_unsupported_or_missing_extensions() {
        assert!(!has_supported_extension("archive.tar.gz"));
        assert!(!has_supported_extension("no_extension"));
        assert!(!has_supported_extension("image.png"));
    }
}
