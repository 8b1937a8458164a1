//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use payments_types::dto::{
    CancelPaymentRequest, CompletePaymentRequest, CreatePaymentRequest, FailPaymentRequest,
    ListPaymentsQuery, PaymentResponse, RefundPaymentBody, RefundResponse,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::inbound::TENANT_HEADER;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Create a pending payment
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    security(("tenant" = [])),
    responses(
        (status = 201, description = "Payment created", body = PaymentResponse),
        (status = 400, description = "Invalid amount, currency or provider"),
        (status = 401, description = "Missing tenant")
    )
)]
async fn create_payment() {}

/// List the tenant's payments, newest first
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "payments",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("provider" = Option<String>, Query, description = "Filter by provider type"),
        ("orderId" = Option<String>, Query, description = "Filter by order id"),
        ("limit" = Option<usize>, Query, description = "Page size (default 50)"),
        ("offset" = Option<usize>, Query, description = "Rows to skip")
    ),
    security(("tenant" = [])),
    responses(
        (status = 200, description = "Payments", body = Vec<PaymentResponse>),
        (status = 400, description = "Unknown status or provider filter")
    )
)]
async fn list_payments() {}

/// Get a payment
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "payments",
    security(("tenant" = [])),
    params(("id" = String, Path, description = "Payment ID (UUID v7)")),
    responses(
        (status = 200, description = "Payment found", body = PaymentResponse),
        (status = 404, description = "Payment not found for this tenant")
    )
)]
async fn get_payment() {}

/// Move a pending payment into processing
#[utoipa::path(
    post,
    path = "/api/payments/{id}/process",
    tag = "lifecycle",
    security(("tenant" = [])),
    params(("id" = String, Path, description = "Payment ID (UUID v7)")),
    responses(
        (status = 200, description = "Payment processing", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Illegal state transition")
    )
)]
async fn start_processing() {}

/// Record the provider capture
#[utoipa::path(
    post,
    path = "/api/payments/{id}/complete",
    tag = "lifecycle",
    request_body = CompletePaymentRequest,
    security(("tenant" = [])),
    params(("id" = String, Path, description = "Payment ID (UUID v7)")),
    responses(
        (status = 200, description = "Payment completed", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Illegal state transition")
    )
)]
async fn complete_payment() {}

/// Record a provider rejection
#[utoipa::path(
    post,
    path = "/api/payments/{id}/fail",
    tag = "lifecycle",
    request_body = FailPaymentRequest,
    security(("tenant" = [])),
    params(("id" = String, Path, description = "Payment ID (UUID v7)")),
    responses(
        (status = 200, description = "Payment failed", body = PaymentResponse),
        (status = 409, description = "Illegal state transition")
    )
)]
async fn fail_payment() {}

/// Cancel a payment that has not completed
#[utoipa::path(
    post,
    path = "/api/payments/{id}/cancel",
    tag = "lifecycle",
    request_body = CancelPaymentRequest,
    security(("tenant" = [])),
    params(("id" = String, Path, description = "Payment ID (UUID v7)")),
    responses(
        (status = 200, description = "Payment cancelled", body = PaymentResponse),
        (status = 409, description = "Illegal state transition")
    )
)]
async fn cancel_payment() {}

/// Refund all or part of a payment
#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    tag = "refunds",
    request_body = RefundPaymentBody,
    security(("tenant" = [])),
    params(("id" = String, Path, description = "Payment ID (UUID v7)")),
    responses(
        (status = 200, description = "Refund outcome; failures carry status FAILED and an error", body = RefundResponse)
    )
)]
async fn refund_payment() {}

/// OpenAPI documentation for the Payments API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payments Lifecycle API",
        version = "1.0.0",
        description = "Multi-tenant payment lifecycle: creation, processing, completion, failure, cancellation and refunds through external providers.\n\n## Tenancy\n\nEvery `/api` endpoint requires the tenant header:\n\n```\nX-Tenant-Id: tenant-a\n```\n\nPayments of other tenants are reported as not found.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_payment,
        list_payments,
        get_payment,
        start_processing,
        complete_payment,
        fail_payment,
        cancel_payment,
        refund_payment,
    ),
    components(
        schemas(
            CreatePaymentRequest,
            CompletePaymentRequest,
            FailPaymentRequest,
            CancelPaymentRequest,
            ListPaymentsQuery,
            PaymentResponse,
            RefundPaymentBody,
            RefundResponse,
        )
    ),
    modifiers(&TenantAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Payment creation and queries"),
        (name = "lifecycle", description = "Status transitions"),
        (name = "refunds", description = "Refunds through the payment provider"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the tenant header.
struct TenantAddon;

impl Modify for TenantAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "tenant",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(TENANT_HEADER))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_payment_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/payments/{id}/refund"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/payments"));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json["components"]["securitySchemes"]["tenant"]["name"],
            TENANT_HEADER
        );
    }
}
