//! # Notification Signatures
//!
//! Midtrans signs every HTTP notification with
//! `sha512(order_id + status_code + gross_amount + server_key)`, hex encoded,
//! and sends it as `signature_key`.

use crate::config::MidtransConfig;
use order_core::{NotificationVerifier, OrderError, OrderResult, PaymentNotification};
use sha2::{Digest, Sha512};
use tracing::debug;

/// Checks `signature_key` against the configured server key
pub struct SignatureVerifier {
    server_key: String,
}

impl SignatureVerifier {
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
        }
    }

    pub fn from_config(config: &MidtransConfig) -> Self {
        Self::new(config.server_key.clone())
    }
}

impl NotificationVerifier for SignatureVerifier {
    fn verify(&self, notification: &PaymentNotification) -> OrderResult<()> {
        let (Some(status_code), Some(gross_amount), Some(signature)) = (
            notification.status_code.as_deref(),
            notification.gross_amount.as_deref(),
            notification.signature_key.as_deref(),
        ) else {
            return Err(OrderError::NotificationVerificationFailed(
                "Missing signature fields".to_string(),
            ));
        };

        let expected = compute_signature(
            &notification.order_id,
            status_code,
            gross_amount,
            &self.server_key,
        );

        if !constant_time_compare(&signature.to_ascii_lowercase(), &expected) {
            return Err(OrderError::NotificationVerificationFailed(
                "Signature mismatch".to_string(),
            ));
        }

        debug!("Verified Midtrans notification for {}", notification.order_id);
        Ok(())
    }
}

pub fn compute_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
