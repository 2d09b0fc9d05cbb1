use crate::cli::ServeArgs;
use crate::infra::{seeded_store, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_intake::config::AppConfig;
use loan_intake::error::AppError;
use loan_intake::loans::{AdmissionController, GeoIpClient};
use loan_intake::telemetry;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.blacklist.take() {
        config.admission.blacklist_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(seeded_store(config.admission.blacklist_path.as_deref())?);
    let lookup = Arc::new(GeoIpClient::new(
        config.geoip.endpoint.clone(),
        config.geoip.timeout(),
    )?);
    let controller = Arc::new(AdmissionController::new(
        store,
        lookup,
        &config.admission,
        config.geoip.timeout(),
    ));

    let app = with_service_routes(controller)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        window_ms = config.admission.window_ms,
        count_limit = config.admission.count_limit,
        default_country = %config.admission.default_country,
        "loan intake service ready"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
