use blockscout_service_launcher::{
    database::{DatabaseConnectSettings, DatabaseSettings},
    launcher::{ConfigSettings, MetricsSettings, ServerSettings},
    tracing::{JaegerSettings, TracingSettings},
};
use sensiscan_logic::{
    object_store::{ObjectStoreSettings, MAX_OBJECT_BYTES},
    queue::QueueSettings,
    worker::WorkerSettings,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub tracing: TracingSettings,
    #[serde(default)]
    pub jaeger: JaegerSettings,
    pub database: DatabaseSettings,

    pub object_store: ObjectStoreSettings,
    pub queue: QueueSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default)]
    pub api: ApiSettings,
}

impl ConfigSettings for Settings {
    const SERVICE_NAME: &'static str = "SENSISCAN";
}

impl Settings {
    /// Settings suitable for integration tests: a real (ephemeral) database,
    /// a local-stack-shaped object store and queue that are never actually
    /// reached unless a test exercises the ingestor/worker against wiremock
    /// or LocalStack. Mirrors `da_indexer_server::Settings::default`.
    pub fn default(database_url: String) -> Self {
        Self {
            server: Default::default(),
            metrics: Default::default(),
            tracing: Default::default(),
            jaeger: Default::default(),
            database: DatabaseSettings {
                connect: DatabaseConnectSettings::Url(database_url),
                create_database: Default::default(),
                run_migrations: Default::default(),
            },
            object_store: ObjectStoreSettings {
                region: "us-east-1".to_string(),
                endpoint: Some("http://localhost:4566".to_string()),
                access_key_id: Some("test".to_string()),
                secret_access_key: Some("test".to_string()),
                force_path_style: true,
                max_object_bytes: MAX_OBJECT_BYTES,
            },
            queue: QueueSettings {
                queue_url: "http://localhost:4566/000000000000/sensiscan-scan".to_string(),
                region: "us-east-1".to_string(),
                endpoint: Some("http://localhost:4566".to_string()),
                wait_time_seconds: 1,
                visibility_timeout_seconds: 30,
                max_batch_size: 10,
            },
            worker: Default::default(),
            api: Default::default(),
        }
    }
}

/// Pagination defaults for `ListFindings`, mirroring
/// `interchain-indexer-server::settings::ApiSettings`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiSettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

fn default_page_size() -> u64 {
    100
}

fn default_max_page_size() -> u64 {
    1000
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}
