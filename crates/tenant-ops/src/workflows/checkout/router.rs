use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    AttachmentKind, CheckoutId, CheckoutView, CompleteCheckout, DepositCalculation, FileUpload,
    InitiateCheckout, InspectionUpdate, ProcessRefund,
};
use super::service::{CheckoutError, CheckoutWorkflowService};
use crate::workflows::actor_from;
use crate::workflows::directory::TenantId;
use crate::workflows::store::RepositoryError;

/// Router builder exposing the move-out workflow over HTTP.
pub fn checkout_router(service: Arc<CheckoutWorkflowService>) -> Router {
    Router::new()
        .route("/api/v1/checkouts", post(initiate_handler))
        .route("/api/v1/checkouts/:checkout_id", get(get_handler))
        .route(
            "/api/v1/checkouts/:checkout_id/inspection",
            post(inspection_handler),
        )
        .route(
            "/api/v1/checkouts/:checkout_id/deductions",
            post(deductions_handler),
        )
        .route(
            "/api/v1/checkouts/:checkout_id/refund/approve",
            post(approve_handler),
        )
        .route(
            "/api/v1/checkouts/:checkout_id/refund/process",
            post(refund_handler),
        )
        .route(
            "/api/v1/checkouts/:checkout_id/complete",
            post(complete_handler),
        )
        .route("/api/v1/checkouts/:checkout_id/cancel", post(cancel_handler))
        .route(
            "/api/v1/checkouts/:checkout_id/uploads/:kind/:file_name",
            post(upload_handler),
        )
        .route(
            "/api/v1/checkouts/:checkout_id/attachments/*key",
            get(attachment_url_handler).delete(remove_attachment_handler),
        )
        .route(
            "/api/v1/tenants/:tenant_id/checkouts",
            get(tenant_handler),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelPayload {
    pub(crate) reason: String,
}

fn view_response(
    status: StatusCode,
    result: Result<CheckoutView, CheckoutError>,
) -> Response {
    match result {
        Ok(view) => (status, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: CheckoutError) -> Response {
    let status = match &error {
        CheckoutError::NotFound { .. } => StatusCode::NOT_FOUND,
        CheckoutError::Validation(_) | CheckoutError::InvalidState { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CheckoutError::Conflict(_) | CheckoutError::Repository(RepositoryError::Conflict) => {
            StatusCode::CONFLICT
        }
        CheckoutError::Repository(_) | CheckoutError::Directory(_) | CheckoutError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn initiate_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    headers: HeaderMap,
    Json(request): Json<InitiateCheckout>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::CREATED,
        service
            .initiate_checkout(request, &actor)
            .map(|record| record.status_view()),
    )
}

pub(crate) async fn get_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path(checkout_id): Path<String>,
) -> Response {
    match service.get(&CheckoutId(checkout_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn tenant_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path(tenant_id): Path<String>,
) -> Response {
    match service.list_for_tenant(&TenantId(tenant_id)) {
        Ok(records) => {
            let views: Vec<CheckoutView> =
                records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn inspection_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path(checkout_id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<InspectionUpdate>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .save_inspection(&CheckoutId(checkout_id), update, &actor)
            .map(|record| record.status_view()),
    )
}

pub(crate) async fn deductions_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path(checkout_id): Path<String>,
    headers: HeaderMap,
    Json(calculation): Json<DepositCalculation>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .save_deposit_calculation(&CheckoutId(checkout_id), calculation, &actor)
            .map(|record| record.status_view()),
    )
}

pub(crate) async fn approve_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path(checkout_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let approver = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .approve_refund(&CheckoutId(checkout_id), &approver)
            .map(|record| record.status_view()),
    )
}

pub(crate) async fn refund_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path(checkout_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ProcessRefund>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .process_refund(&CheckoutId(checkout_id), request, &actor)
            .map(|record| record.status_view()),
    )
}

pub(crate) async fn complete_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path(checkout_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<CompleteCheckout>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .complete_checkout(&CheckoutId(checkout_id), request, &actor)
            .map(|record| record.status_view()),
    )
}

pub(crate) async fn cancel_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path(checkout_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CancelPayload>,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .cancel_checkout(&CheckoutId(checkout_id), &payload.reason, &actor)
            .map(|record| record.status_view()),
    )
}

pub(crate) async fn upload_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path((checkout_id, kind, file_name)): Path<(String, AttachmentKind, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let actor = actor_from(&headers);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let upload = FileUpload {
        file_name,
        content_type,
        bytes: body.to_vec(),
    };

    match service.attach_file(&CheckoutId(checkout_id), kind, upload, &actor) {
        Ok(key) => (StatusCode::CREATED, Json(json!({ "key": key }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn attachment_url_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path((checkout_id, key)): Path<(String, String)>,
) -> Response {
    match service.attachment_url(&CheckoutId(checkout_id), &key) {
        Ok(url) => (StatusCode::OK, Json(json!({ "key": key, "url": url }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_attachment_handler(
    State(service): State<Arc<CheckoutWorkflowService>>,
    Path((checkout_id, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let actor = actor_from(&headers);
    view_response(
        StatusCode::OK,
        service
            .remove_attachment(&CheckoutId(checkout_id), &key, &actor)
            .map(|record| record.status_view()),
    )
}
