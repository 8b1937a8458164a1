//! Domain models for the payment lifecycle.

pub mod amount;
pub mod currency;
pub mod events;
pub mod payment;
pub mod payment_id;
pub mod provider_type;
pub mod status;

pub use amount::Amount;
pub use currency::Currency;
pub use events::{PaymentCompleted, PaymentEvent, PaymentFailed, PaymentInitiated, PaymentRefunded};
pub use payment::{Metadata, Payment, PaymentSnapshot, RefundPlan, metadata_keys};
pub use payment_id::PaymentId;
pub use provider_type::ProviderType;
pub use status::PaymentStatus;
