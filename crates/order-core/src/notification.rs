//! # Payment Notifications
//!
//! Shape of the asynchronous status callback a payment provider posts after a
//! session changes state. The payload is untrusted input.

use serde::{Deserialize, Serialize};

/// Virtual-account channel descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaNumber {
    pub bank: String,
    #[serde(default)]
    pub va_number: String,
}

/// Transaction status notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    /// The order's transaction number (not its primary key)
    pub order_id: String,

    #[serde(default)]
    pub transaction_status: String,

    #[serde(default)]
    pub payment_type: String,

    #[serde(default)]
    pub va_numbers: Vec<VaNumber>,

    /// Provider-side HTTP-ish status code, part of the signed string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,

    /// Gross amount as the provider formats it, part of the signed string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_status: Option<String>,
}

impl PaymentNotification {
    /// `<payment_type>-<first bank>` when virtual accounts are present,
    /// otherwise the bare payment type
    pub fn payment_method(&self) -> String {
        match self.va_numbers.first() {
            Some(va) => format!("{}-{}", self.payment_type, va.bank),
            None => self.payment_type.clone(),
        }
    }
}
