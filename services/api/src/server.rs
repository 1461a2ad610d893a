use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState};
use crate::routes::with_directory_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tech_directory::config::AppConfig;
use tech_directory::directory::DirectorySearchService;
use tech_directory::error::AppError;
use tech_directory::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(catalog) = args.catalog.take() {
        config.catalog.csv_path = Some(catalog);
    }
    if let Some(reviews) = args.reviews.take() {
        config.catalog.reviews_csv_path = Some(reviews);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(load_catalog(
        config.catalog.csv_path.as_deref(),
        config.catalog.reviews_csv_path.as_deref(),
    )?);
    let directory_service = Arc::new(DirectorySearchService::new(catalog));

    let app = with_directory_routes(directory_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "technician directory ready");

    axum::serve(listener, app).await?;
    Ok(())
}
