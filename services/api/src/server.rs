use crate::cli::ServeArgs;
use crate::infra::{build_admissions, AppState};
use crate::routes::with_admission_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use campus_admissions::config::{AdmissionsConfig, AppConfig};
use campus_admissions::error::AppError;
use campus_admissions::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let (app, readiness) = admissions_app(config.admissions.clone(), prometheus_handle);
    let app = app.layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        student_id_prefix = %config.admissions.student_id_prefix,
        offer_validity_days = config.admissions.offer_validity_days,
        "admissions service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Router with admission, payment and probe routes. Readiness starts false
/// and is flipped by the caller once the listener is bound.
pub(crate) fn admissions_app(
    admissions: AdmissionsConfig,
    metrics: PrometheusHandle,
) -> (Router, Arc<AtomicBool>) {
    let readiness = Arc::new(AtomicBool::new(false));
    let wiring = build_admissions(admissions);
    let state = AppState {
        readiness: readiness.clone(),
        metrics: Arc::new(metrics),
        payments: wiring.payments.clone(),
    };

    let app = with_admission_routes(wiring.service).layer(Extension(state));
    (app, readiness)
}
