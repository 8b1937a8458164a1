//! # Payments Hex
//!
//! Application service layer and HTTP adapter for the payments service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (payment lifecycle and refund use cases)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - API description served at `/api-docs/openapi.json`
//!
//! The service is generic over `R: PaymentRepository`, allowing
//! different repository implementations to be injected. Provider
//! resolution and event publishing are injected as trait objects.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::PaymentService;
