use crate::infra::{AppState, Workflows};
use crate::scheduler::{run_daily, DailyRunSummary};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tenant_ops::error::AppError;
use tenant_ops::workflows::checkout::checkout_router;
use tenant_ops::workflows::pdc::{pdc_router, PdcLifecycleService};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DailyRunRequest {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn with_workflow_routes(workflows: &Workflows) -> Router {
    let scheduler = Router::new()
        .route("/api/v1/scheduler/run-daily", post(run_daily_endpoint))
        .with_state(workflows.pdc.clone());

    pdc_router(workflows.pdc.clone())
        .merge(checkout_router(workflows.checkout.clone()))
        .merge(scheduler)
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

/// Trigger the daily cheque job out of schedule, e.g. after a bulk import.
pub(crate) async fn run_daily_endpoint(
    State(service): State<Arc<PdcLifecycleService>>,
    Json(payload): Json<DailyRunRequest>,
) -> Result<Json<DailyRunSummary>, AppError> {
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    run_daily(&service, today).map(Json)
}
