use crate::infra::{ApiService, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use campus_admissions::error::AppError;
use campus_admissions::workflows::admissions::{admissions_router, Payment};
use campus_admissions::workflows::payments::PaymentCsvImporter;
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct PaymentImportResponse {
    pub(crate) imported: usize,
    pub(crate) ledger_size: usize,
}

pub(crate) fn with_admission_routes(service: Arc<ApiService>) -> axum::Router {
    admissions_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/payments", axum::routing::post(record_payment_endpoint))
        .route(
            "/api/v1/payments/import",
            axum::routing::post(import_payments_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Record a single payment fact pushed by the gateway callback.
pub(crate) async fn record_payment_endpoint(
    Extension(state): Extension<AppState>,
    Json(payment): Json<Payment>,
) -> (StatusCode, Json<Payment>) {
    state.payments.record(payment.clone());
    (StatusCode::CREATED, Json(payment))
}

/// Append every row of a gateway CSV export to the payment ledger.
pub(crate) async fn import_payments_endpoint(
    Extension(state): Extension<AppState>,
    body: String,
) -> Result<Json<PaymentImportResponse>, AppError> {
    let payments = PaymentCsvImporter::from_reader(Cursor::new(body.into_bytes()))?;
    let imported = state.payments.import(payments);

    Ok(Json(PaymentImportResponse {
        imported,
        ledger_size: state.payments.len(),
    }))
}
