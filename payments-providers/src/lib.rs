//! # Payment Providers
//!
//! Outbound adapters for external payment processors: a generic HTTP client
//! per provider and a registry resolving which client a tenant uses.

pub mod http;
pub mod registry;

pub use http::HttpProviderClient;
pub use registry::ProviderRegistry;
