//! Webhook payload signing.
//!
//! Signatures cover `"{timestamp}.{body}"` and verification rejects
//! timestamps outside [`TOLERANCE_SECS`] of the receiver's clock, so a captured
//! delivery can only be replayed inside that window.
//! Header format: `t=<unix seconds>,v1=<hex hmac>`.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "X-Payments-Signature";

/// Largest accepted distance between a signature timestamp and now.
pub const TOLERANCE_SECS: i64 = 300;

/// Signs and verifies webhook deliveries with a shared secret.
#[derive(Clone)]
pub struct WebhookSigner {
    secret: String,
}

impl WebhookSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Builds the signature header value for a payload sent at `timestamp`.
    pub fn sign(&self, timestamp: i64, payload: &[u8]) -> String {
        format!("t={},v1={}", timestamp, self.mac(timestamp, payload))
    }

    /// Verifies a signature header against the current time.
    pub fn verify(&self, payload: &[u8], header: &str) -> bool {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// Verifies a signature header as of `now` using constant-time comparison.
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> bool {
        let mut timestamp = None;
        let mut signature = None;
        for part in header.split(',') {
            match part.split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signature = Some(value),
                _ => {}
            }
        }

        match (timestamp, signature) {
            (Some(timestamp), Some(signature)) => {
                if now.abs_diff(timestamp) > TOLERANCE_SECS as u64 {
                    return false;
                }
                let expected = self.mac(timestamp, payload);
                expected.as_bytes().ct_eq(signature.as_bytes()).into()
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for WebhookSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSigner").finish_non_exhaustive()
    }
}
