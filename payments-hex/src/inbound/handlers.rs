//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use payments_types::{
    AppError, CancelPaymentRequest, CompletePaymentRequest, CreatePaymentRequest,
    FailPaymentRequest, ListPaymentsQuery, PaymentId, PaymentRepository, PaymentResponse,
    RefundPaymentBody, RefundRequest,
};

use super::tenant::TenantContext;
use crate::PaymentService;

/// Application state shared across handlers.
pub struct AppState<R: PaymentRepository> {
    pub service: PaymentService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::IllegalStateTransition(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedOperation(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_payment_id(id: &str) -> Result<PaymentId, ApiError> {
    PaymentId::parse(id).map_err(|e| ApiError(e.into()))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// OpenAPI document.
pub async fn openapi() -> impl IntoResponse {
    use utoipa::OpenApi;
    Json(crate::openapi::ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(tenant_id = %tenant.id(), order_id = %req.order_id))]
pub async fn create_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(tenant): Extension<TenantContext>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.service.create_payment(tenant.id(), req).await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(&payment))))
}

/// List the tenant's payments.
#[tracing::instrument(skip(state), fields(tenant_id = %tenant.id()))]
pub async fn list_payments<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(tenant): Extension<TenantContext>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.service.list_payments(tenant.id(), query).await?;
    let response: Vec<PaymentResponse> = payments.iter().map(PaymentResponse::from).collect();
    Ok(Json(response))
}

/// Get payment by ID.
#[tracing::instrument(skip(state), fields(tenant_id = %tenant.id(), payment_id = %id))]
pub async fn get_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;
    let payment = state.service.get_payment(tenant.id(), payment_id).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

#[tracing::instrument(skip(state), fields(tenant_id = %tenant.id(), payment_id = %id))]
pub async fn start_processing<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;
    let payment = state
        .service
        .start_processing(tenant.id(), payment_id)
        .await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

#[tracing::instrument(skip(state, req), fields(tenant_id = %tenant.id(), payment_id = %id))]
pub async fn complete_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(req): Json<CompletePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;
    let payment = state
        .service
        .complete_payment(tenant.id(), payment_id, req)
        .await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

#[tracing::instrument(skip(state, req), fields(tenant_id = %tenant.id(), payment_id = %id))]
pub async fn fail_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(req): Json<FailPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;
    let payment = state
        .service
        .fail_payment(tenant.id(), payment_id, req)
        .await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

/// Cancel a payment. The body is optional.
#[tracing::instrument(skip(state, req), fields(tenant_id = %tenant.id(), payment_id = %id))]
pub async fn cancel_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    req: Option<Json<CancelPaymentRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let payment = state
        .service
        .cancel_payment(tenant.id(), payment_id, req)
        .await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

/// Refund a payment. Always answers 200 with the structured outcome.
#[tracing::instrument(skip(state, body), fields(tenant_id = %tenant.id(), payment_id = %id))]
pub async fn refund_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    body: Option<Json<RefundPaymentBody>>,
) -> impl IntoResponse {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let response = state
        .service
        .refund_payment(RefundRequest {
            payment_id: id,
            tenant_id: tenant.0,
            amount: body.amount,
            reason: body.reason,
        })
        .await;
    Json(response)
}
