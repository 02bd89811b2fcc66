use std::sync::Arc;

use blockscout_service_launcher::{
    database, launcher,
    launcher::LaunchSettings,
    tracing as bs_tracing,
};
use sensiscan_logic::{database::Database, ingestor::Ingestor, object_store::ObjectStore, queue::Queue};
use sensiscan_migration::Migrator;

use crate::{handlers, settings::ApiSettings, settings::Settings};

const SERVICE_NAME: &str = "sensiscan";

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
    pub db: Database,
    pub api: ApiSettings,
}

#[derive(Clone)]
struct Router {
    state: AppState,
}

impl launcher::HttpRouter for Router {
    fn register_routes(&self, service_config: &mut actix_web::web::ServiceConfig) {
        let state = actix_web::web::Data::new(self.state.clone());
        service_config
            .app_data(state)
            .route("/health", actix_web::web::get().to(handlers::health::health))
            .service(
                actix_web::web::scope("/api/v1")
                    .route("/scan", actix_web::web::post().to(handlers::scan::create_scan))
                    .route(
                        "/jobs/{job_id}",
                        actix_web::web::get().to(handlers::jobs::get_job),
                    )
                    .route(
                        "/findings",
                        actix_web::web::get().to(handlers::findings::list_findings),
                    ),
            );
    }
}

/// Ambient gRPC surface: a bare health service so the launcher's dual
/// HTTP+gRPC shape is satisfied even though every business operation here
/// is REST. Disabled by default via `server.grpc.enabled = false`.
fn grpc_router() -> tonic::transport::server::Router {
    let (_health_reporter, health_service) = tonic_health::server::health_reporter();
    tonic::transport::Server::builder().add_service(health_service)
}

pub async fn run(settings: Settings) -> Result<(), anyhow::Error> {
    bs_tracing::init_logs(SERVICE_NAME, &settings.tracing, &settings.jaeger)?;

    let db_connection =
        Arc::new(database::initialize_postgres::<Migrator>(&settings.database).await?);
    let db = Database::new(db_connection);

    let object_store = Arc::new(ObjectStore::new(settings.object_store.clone()).await?);
    let queue = Arc::new(Queue::new(settings.queue.clone()).await?);
    let ingestor = Arc::new(Ingestor::new(db.clone(), object_store, queue));

    let state = AppState {
        ingestor,
        db,
        api: settings.api.clone(),
    };
    let router = Router { state };

    let launch_settings = LaunchSettings {
        service_name: SERVICE_NAME.to_string(),
        server: settings.server,
        metrics: settings.metrics,
    };

    launcher::launch(&launch_settings, router, grpc_router()).await
}
