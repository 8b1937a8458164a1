//! # Payments Types
//!
//! Payment aggregate, value objects and port traits for the payment lifecycle core.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Value objects, the `Payment` aggregate and its domain events
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Amount, Currency, Metadata, Payment, PaymentCompleted, PaymentEvent, PaymentFailed,
    PaymentId, PaymentInitiated, PaymentRefunded, PaymentSnapshot, PaymentStatus, ProviderType,
    RefundPlan,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    EventPublisher, PaymentProvider, PaymentRepository, ProviderError, ProviderFactory,
    ProviderRefundRequest, ProviderRefundResponse, PublishError, RefundGateway,
};
