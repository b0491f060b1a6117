use crate::cli::ServeArgs;
use crate::infra::{load_engine, AppState};
use crate::routes::with_comparison_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fehb_compare::config::AppConfig;
use fehb_compare::error::AppError;
use fehb_compare::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(load_engine(&config.data)?);
    let plan_count = engine.tables().plans.len();

    let app = with_comparison_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, plans = plan_count, "plan comparison service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
