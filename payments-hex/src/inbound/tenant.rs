//! Tenant resolution middleware.

use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the calling tenant.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// Tenant of the current request, inserted as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext(pub String);

impl TenantContext {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Paths served without a tenant.
fn is_public(path: &str) -> bool {
    path == "/health" || path == "/api-docs/openapi.json"
}

/// Reads the tenant from `X-Tenant-Id`.
/// Expected format: a non-blank string; surrounding whitespace is dropped.
fn extract_tenant(header: &str) -> Option<&str> {
    let tenant = header.trim();
    (!tenant.is_empty()).then_some(tenant)
}

/// Rejects requests without a tenant with 401 Unauthorized.
///
/// Endpoints that bypass the check:
/// - `/health` - Health check endpoint
/// - `/api-docs/openapi.json` - API description
pub async fn tenant_middleware(mut request: Request<Body>, next: Next) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let tenant = request
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_tenant)
        .map(String::from);

    match tenant {
        Some(tenant) => {
            request.extensions_mut().insert(TenantContext(tenant));
            next.run(request).await
        }
        None => unauthorized_response("Missing or blank X-Tenant-Id header"),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tenant() {
        assert_eq!(extract_tenant("tenant-a"), Some("tenant-a"));
        assert_eq!(extract_tenant("  tenant-a "), Some("tenant-a"));
    }

    #[test]
    fn test_extract_tenant_blank() {
        assert_eq!(extract_tenant("   "), None);
        assert_eq!(extract_tenant(""), None);
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public("/health"));
        assert!(is_public("/api-docs/openapi.json"));
        assert!(!is_public("/api/payments"));
    }
}
