//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod handlers;
mod server;
mod tenant;

pub use handlers::ApiError;
pub use server::HttpServer;
pub use tenant::{TENANT_HEADER, TenantContext};
