use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    DepositRequest, NewPdc, NewPdcBatch, PdcId, PdcView, ReplacementCheque, WithdrawRequest,
};
use super::service::{PdcError, PdcLifecycleService};
use crate::workflows::actor_from;
use crate::workflows::directory::TenantId;
use crate::workflows::store::RepositoryError;

/// Router builder exposing the cheque lifecycle over HTTP.
pub fn pdc_router(service: Arc<PdcLifecycleService>) -> Router {
    Router::new()
        .route("/api/v1/pdcs", post(create_handler))
        .route("/api/v1/pdcs/bulk", post(bulk_handler))
        .route("/api/v1/pdcs/:pdc_id", get(get_handler))
        .route("/api/v1/pdcs/:pdc_id/deposit", post(deposit_handler))
        .route("/api/v1/pdcs/:pdc_id/clear", post(clear_handler))
        .route("/api/v1/pdcs/:pdc_id/bounce", post(bounce_handler))
        .route("/api/v1/pdcs/:pdc_id/replace", post(replace_handler))
        .route("/api/v1/pdcs/:pdc_id/withdraw", post(withdraw_handler))
        .route("/api/v1/pdcs/:pdc_id/cancel", post(cancel_handler))
        .route("/api/v1/tenants/:tenant_id/pdcs", get(tenant_handler))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClearPayload {
    #[serde(default)]
    pub(crate) cleared_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BouncePayload {
    pub(crate) reason: String,
    #[serde(default)]
    pub(crate) bounced_date: Option<NaiveDate>,
}

fn view_response(status: StatusCode, result: Result<PdcView, PdcError>) -> Response {
    match result {
        Ok(view) => (status, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: PdcError) -> Response {
    let status = match &error {
        PdcError::NotFound { .. } => StatusCode::NOT_FOUND,
        PdcError::Validation(_) | PdcError::InvalidTransition { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PdcError::DuplicateCheque { .. } | PdcError::Repository(RepositoryError::Conflict) => {
            StatusCode::CONFLICT
        }
        PdcError::Repository(_) | PdcError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn create_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    headers: HeaderMap,
    Json(request): Json<NewPdc>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::CREATED,
        service.create(request, &actor).map(|pdc| pdc.status_view()),
    )
}

pub(crate) async fn bulk_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    headers: HeaderMap,
    Json(batch): Json<NewPdcBatch>,
) -> Response {
    let actor = actor_from(&headers);
    match service.create_bulk(batch, &actor) {
        Ok(records) => {
            let views: Vec<PdcView> = records.iter().map(|pdc| pdc.status_view()).collect();
            (StatusCode::CREATED, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    Path(pdc_id): Path<String>,
) -> Response {
    match service.get(&PdcId(pdc_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn tenant_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    Path(tenant_id): Path<String>,
) -> Response {
    match service.list_for_tenant(&TenantId(tenant_id)) {
        Ok(records) => {
            let views: Vec<PdcView> = records.iter().map(|pdc| pdc.status_view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn deposit_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    Path(pdc_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<DepositRequest>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .deposit(&PdcId(pdc_id), request, &actor)
            .map(|pdc| pdc.status_view()),
    )
}

pub(crate) async fn clear_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    Path(pdc_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ClearPayload>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .clear(&PdcId(pdc_id), payload.cleared_date, &actor)
            .map(|pdc| pdc.status_view()),
    )
}

pub(crate) async fn bounce_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    Path(pdc_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<BouncePayload>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .bounce(&PdcId(pdc_id), &payload.reason, payload.bounced_date, &actor)
            .map(|pdc| pdc.status_view()),
    )
}

pub(crate) async fn replace_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    Path(pdc_id): Path<String>,
    headers: HeaderMap,
    Json(replacement): Json<ReplacementCheque>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::CREATED,
        service
            .replace(&PdcId(pdc_id), replacement, &actor)
            .map(|pdc| pdc.status_view()),
    )
}

pub(crate) async fn withdraw_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    Path(pdc_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<WithdrawRequest>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .withdraw(&PdcId(pdc_id), request, &actor)
            .map(|pdc| pdc.status_view()),
    )
}

pub(crate) async fn cancel_handler(
    State(service): State<Arc<PdcLifecycleService>>,
    Path(pdc_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .cancel(&PdcId(pdc_id), &actor)
            .map(|pdc| pdc.status_view()),
    )
}
