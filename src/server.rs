use crate::cli::ServeArgs;
use crate::infra::{AppState, ScoringCatalog};
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use impg_maturity::config::AppConfig;
use impg_maturity::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let catalog = Arc::new(ScoringCatalog::load()?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog,
    };

    let app = router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        default_variant = %config.scoring.default_variant,
        "maturity scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
