//! Error types for the payment service.

use crate::domain::{Amount, PaymentStatus};
use crate::ports::ProviderError;

/// Domain-level errors (business rule violations).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Illegal state transition from {from} to {to}")]
    IllegalStateTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Refund amount {requested} exceeds refundable amount {available}")]
    RefundExceedsAmount { requested: Amount, available: Amount },
}

impl DomainError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// True for every error in the illegal-state-transition class,
    /// including refunds larger than the refundable amount.
    pub fn is_illegal_state_transition(&self) -> bool {
        matches!(
            self,
            DomainError::IllegalStateTransition { .. } | DomainError::RefundExceedsAmount { .. }
        )
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Entity not found")]
    NotFound,

    /// A stale aggregate was written (optimistic concurrency check failed).
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors returned by the service layer.
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Illegal state transition: {0}")]
    IllegalStateTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            e @ (DomainError::IllegalStateTransition { .. }
            | DomainError::RefundExceedsAmount { .. }) => {
                AppError::IllegalStateTransition(e.to_string())
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Storage(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::Conflict(e),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UnsupportedOperation(_) => AppError::UnsupportedOperation(err.to_string()),
            other => AppError::Provider(other.to_string()),
        }
    }
}
