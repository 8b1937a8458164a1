//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod provider;
mod publisher;
mod repository;

pub use provider::{
    PaymentProvider, ProviderError, ProviderFactory, ProviderRefundRequest,
    ProviderRefundResponse, RefundGateway,
};
pub use publisher::{EventPublisher, PublishError};
pub use repository::PaymentRepository;
