//! # Payments Repository
//!
//! Concrete adapters for the payments service: the repository implementing
//! the `PaymentRepository` port and the event publishers implementing
//! `EventPublisher`.

pub mod memory;
pub mod publishers;
pub mod security;

#[cfg(test)]
mod memory_tests;

pub use memory::InMemoryPaymentRepository;
pub use publishers::{
    EventEnvelope, FanoutEventPublisher, TracingEventPublisher, WebhookEventPublisher,
};
pub use security::{SIGNATURE_HEADER, TOLERANCE_SECS, WebhookSigner};

/// Builds the default repository.
pub fn build_repo() -> InMemoryPaymentRepository {
    InMemoryPaymentRepository::new()
}
