use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json};
use lendfront::eligibility::{assess, EligibilityInput};
use lendfront::invoices::{invoice_router, AdminAccess, InvoiceRepository, InvoiceService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_invoice_routes<R>(
    service: Arc<InvoiceService<R>>,
    access: AdminAccess,
) -> axum::Router
where
    R: InvoiceRepository + 'static,
{
    invoice_router(service, access)
        .route("/api/v1/eligibility", post(eligibility_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
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

pub(crate) async fn eligibility_endpoint(
    payload: Result<Json<EligibilityInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": rejection.body_text() })),
            )
                .into_response();
        }
    };

    match assess(&input) {
        Some(result) => (StatusCode::OK, Json(result)).into_response(),
        None => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "monthlyIncome and loanAmount must be positive and loanTenure at least one month",
            })),
        )
            .into_response(),
    }
}
