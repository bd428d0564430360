use crate::cli::ServeArgs;
use crate::infra::{AppState, InvoiceStore};
use crate::routes::with_invoice_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lendfront::config::AppConfig;
use lendfront::error::AppError;
use lendfront::invoices::{AdminAccess, InvoiceRepository, InvoiceService};
use lendfront::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = InvoiceStore::from_config(&config.storage).await?;
    let stored = store.count().await?;
    let invoice_service = Arc::new(
        InvoiceService::new(Arc::new(store))
            .with_max_page_size(config.storage.max_page_size)
            .with_sequence_start(stored + 1),
    );

    let access = AdminAccess::from_config(&config.access);
    if access.is_open() {
        warn!("APP_ADMIN_TOKEN is not set; invoice listing and export are unauthenticated");
    }

    let app = with_invoice_routes(invoice_service, access)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        persistent = config.storage.database_url.is_some(),
        stored,
        "lendfront api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
