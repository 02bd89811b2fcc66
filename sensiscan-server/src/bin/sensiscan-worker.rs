use std::{sync::Arc, time::Duration};

use blockscout_service_launcher::{database, launcher::ConfigSettings, tracing as bs_tracing};
use sensiscan_logic::{database::Database, object_store::ObjectStore, queue::Queue, worker::Worker};
use sensiscan_migration::Migrator;
use sensiscan_server::Settings;
use tokio_util::sync::CancellationToken;

const SERVICE_NAME: &str = "sensiscan-worker";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let settings = Settings::build().expect("failed to read config");
    bs_tracing::init_logs(SERVICE_NAME, &settings.tracing, &settings.jaeger)?;

    let db_connection =
        Arc::new(database::initialize_postgres::<Migrator>(&settings.database).await?);
    let db = Database::new(db_connection);
    let object_store = ObjectStore::new(settings.object_store.clone()).await?;
    let queue = Arc::new(Queue::new(settings.queue.clone()).await?);
    let worker = Worker::new(db, object_store, queue);

    let cancellation = CancellationToken::new();
    let shutdown_cancellation = cancellation.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
        shutdown_cancellation.cancel();
    });

    worker.run(cancellation).await;

    tracing::info!(
        grace_seconds = settings.worker.shutdown_grace_seconds,
        "worker loop exited, waiting out shutdown grace period"
    );
    tokio::time::sleep(Duration::from_secs(settings.worker.shutdown_grace_seconds)).await;

    Ok(())
}
