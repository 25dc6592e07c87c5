//! # Order Types
//!
//! The order record, its status state machine and the request bodies that
//! create or update it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, payment session issued, no settlement yet
    #[serde(alias = "not_yet_paid")]
    AwaitingPayment,
    /// Provider reported settlement
    #[serde(alias = "get_paid")]
    Paid,
    /// Provider or buyer cancelled
    Canceled,
    /// Payment window elapsed
    Expired,
    /// Seller is preparing the order
    Processed,
    /// Handed to the courier
    Sent,
    /// Delivered
    Completed,
}

/// Vocabulary accepted by the manual status update
pub const MANUAL_STATUS_VOCABULARY: &[OrderStatus] = &[
    OrderStatus::AwaitingPayment,
    OrderStatus::Expired,
    OrderStatus::Paid,
    OrderStatus::Processed,
    OrderStatus::Sent,
    OrderStatus::Completed,
    OrderStatus::Canceled,
];

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AwaitingPayment => "awaiting_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Expired => "expired",
            OrderStatus::Processed => "processed",
            OrderStatus::Sent => "sent",
            OrderStatus::Completed => "completed",
        }
    }

    /// Parse a wire label, accepting the legacy `not_yet_paid`/`get_paid` names
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "awaiting_payment" | "not_yet_paid" => Some(OrderStatus::AwaitingPayment),
            "paid" | "get_paid" => Some(OrderStatus::Paid),
            "canceled" => Some(OrderStatus::Canceled),
            "expired" => Some(OrderStatus::Expired),
            "processed" => Some(OrderStatus::Processed),
            "sent" => Some(OrderStatus::Sent),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// Whether a seller may move this order by hand.
    ///
    /// Only orders that have been paid (or gone further) are eligible.
    pub fn accepts_manual_update(&self) -> bool {
        !matches!(
            self,
            OrderStatus::AwaitingPayment | OrderStatus::Expired | OrderStatus::Canceled
        )
    }

    /// Apply a provider-reported status.
    ///
    /// Returns the status to write, or `None` when the notification must not
    /// touch the status. From `awaiting_payment` every mapped status applies;
    /// re-reporting the current status rewrites it unchanged; nothing moves an
    /// order out of a terminal or fulfillment state.
    pub fn on_provider_status(&self, reported: ProviderStatus) -> Option<OrderStatus> {
        let target = reported.order_status();
        match self {
            OrderStatus::AwaitingPayment => Some(target),
            current if *current == target => Some(target),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::parse(s).ok_or_else(|| format!("unknown order status: {}", s))
    }
}

/// Transaction status labels the payment provider reports.
///
/// Matching is exact and case-sensitive; anything else is not a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Pending,
    Settlement,
    Cancel,
    Expire,
}

impl ProviderStatus {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "pending" => Some(ProviderStatus::Pending),
            "settlement" => Some(ProviderStatus::Settlement),
            "cancel" => Some(ProviderStatus::Cancel),
            "expire" => Some(ProviderStatus::Expire),
            _ => None,
        }
    }

    pub fn order_status(&self) -> OrderStatus {
        match self {
            ProviderStatus::Pending => OrderStatus::AwaitingPayment,
            ProviderStatus::Settlement => OrderStatus::Paid,
            ProviderStatus::Cancel => OrderStatus::Canceled,
            ProviderStatus::Expire => OrderStatus::Expired,
        }
    }
}

/// A persisted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Order {
    /// Store-assigned identity (0 until persisted)
    pub id: u64,

    #[validate(range(min = 1, message = "user_id is required"))]
    pub user_id: u64,

    #[validate(range(min = 1, message = "checkout_id is required"))]
    pub checkout_id: u64,

    #[validate(range(min = 1, message = "address_id is required"))]
    pub address_id: u64,

    /// Correlation key shared with the payment provider
    #[validate(length(min = 1, max = 64, message = "transaction_number is required"))]
    pub transaction_number: String,

    #[validate(range(min = 0, message = "total_price must not be negative"))]
    pub total_price: i64,

    pub status: OrderStatus,

    /// Set by the payment reconciler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// A fresh order awaiting payment
    pub fn awaiting_payment(
        user_id: u64,
        request: &NewOrderRequest,
        transaction_number: impl Into<String>,
        total_price: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            checkout_id: request.checkout_id,
            address_id: request.address_id,
            transaction_number: transaction_number.into(),
            total_price,
            status: OrderStatus::AwaitingPayment,
            payment_method: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: u64) -> bool {
        self.user_id == user_id
    }
}

/// Generate a transaction number for provider correlation.
///
/// Format: `TRX-<yyyymmdd>-<32 hex>`; the random part is a v4 UUID.
pub fn generate_transaction_number() -> String {
    format!(
        "TRX-{}-{}",
        Utc::now().format("%Y%m%d"),
        Uuid::new_v4().simple().to_string().to_uppercase()
    )
}

/// Body of the create-order request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub checkout_id: u64,
    #[serde(default)]
    pub address_id: u64,
}

/// Body of the manual status update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_status_label"))]
    pub status: String,
}

impl StatusUpdateRequest {
    /// The requested status, once validation has passed
    pub fn target(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status).filter(|s| MANUAL_STATUS_VOCABULARY.contains(s))
    }
}

fn validate_status_label(label: &str) -> Result<(), ValidationError> {
    if label.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::from("status is required"));
        return Err(err);
    }
    let known = OrderStatus::parse(label)
        .map(|s| MANUAL_STATUS_VOCABULARY.contains(&s))
        .unwrap_or(false);
    if !known {
        let mut err = ValidationError::new("oneof");
        err.message = Some(Cow::from(
            "status must be one of: awaiting_payment expired paid processed sent completed canceled",
        ));
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewOrderRequest {
        NewOrderRequest {
            checkout_id: 7,
            address_id: 3,
        }
    }

    #[test]
    fn test_new_order_awaits_payment() {
        let order = Order::awaiting_payment(1, &request(), "TRX-1", 50_000);
        assert_eq!(order.status, OrderStatus::AwaitingPayment);
        assert_eq!(order.payment_method, None);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_order_validation_itemizes_fields() {
        let mut order = Order::awaiting_payment(0, &request(), "", 50_000);
        order.address_id = 0;

        let errors = order.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_id"));
        assert!(fields.contains_key("address_id"));
        assert!(fields.contains_key("transaction_number"));
        assert!(!fields.contains_key("checkout_id"));
    }

    #[test]
    fn test_transaction_numbers_are_unique() {
        let a = generate_transaction_number();
        let b = generate_transaction_number();
        assert_ne!(a, b);
        assert!(a.starts_with("TRX-"));
        assert_eq!(a.len(), "TRX-20260101-".len() + 32);
    }

    #[test]
    fn test_provider_label_mapping_is_exact() {
        assert_eq!(ProviderStatus::parse("settlement"), Some(ProviderStatus::Settlement));
        assert_eq!(ProviderStatus::parse("Settlement"), None);
        assert_eq!(ProviderStatus::parse("capture"), None);
        assert_eq!(ProviderStatus::Expire.order_status(), OrderStatus::Expired);
        assert_eq!(ProviderStatus::Pending.order_status(), OrderStatus::AwaitingPayment);
    }

    #[test]
    fn test_state_machine_from_awaiting_payment() {
        let s = OrderStatus::AwaitingPayment;
        assert_eq!(s.on_provider_status(ProviderStatus::Pending), Some(OrderStatus::AwaitingPayment));
        assert_eq!(s.on_provider_status(ProviderStatus::Settlement), Some(OrderStatus::Paid));
        assert_eq!(s.on_provider_status(ProviderStatus::Cancel), Some(OrderStatus::Canceled));
        assert_eq!(s.on_provider_status(ProviderStatus::Expire), Some(OrderStatus::Expired));
    }

    #[test]
    fn test_terminal_states_only_accept_same_status() {
        let paid = OrderStatus::Paid;
        assert_eq!(paid.on_provider_status(ProviderStatus::Settlement), Some(OrderStatus::Paid));
        assert_eq!(paid.on_provider_status(ProviderStatus::Pending), None);
        assert_eq!(paid.on_provider_status(ProviderStatus::Expire), None);

        let expired = OrderStatus::Expired;
        assert_eq!(expired.on_provider_status(ProviderStatus::Settlement), None);

        let sent = OrderStatus::Sent;
        assert_eq!(sent.on_provider_status(ProviderStatus::Settlement), None);
    }

    #[test]
    fn test_manual_update_eligibility() {
        assert!(!OrderStatus::AwaitingPayment.accepts_manual_update());
        assert!(!OrderStatus::Expired.accepts_manual_update());
        assert!(!OrderStatus::Canceled.accepts_manual_update());
        assert!(OrderStatus::Paid.accepts_manual_update());
        assert!(OrderStatus::Sent.accepts_manual_update());
    }

    #[test]
    fn test_legacy_labels() {
        let status: OrderStatus = serde_json::from_str("\"get_paid\"").unwrap();
        assert_eq!(status, OrderStatus::Paid);
        assert_eq!(OrderStatus::parse("not_yet_paid"), Some(OrderStatus::AwaitingPayment));
        assert_eq!(serde_json::to_string(&OrderStatus::Paid).unwrap(), "\"paid\"");
    }

    #[test]
    fn test_status_update_request_validation() {
        let ok = StatusUpdateRequest { status: "sent".into() };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.target(), Some(OrderStatus::Sent));

        let empty = StatusUpdateRequest::default();
        let errors = empty.validate().unwrap_err();
        assert_eq!(errors.field_errors()["status"][0].code, "required");

        let bogus = StatusUpdateRequest { status: "refunded".into() };
        let errors = bogus.validate().unwrap_err();
        assert_eq!(errors.field_errors()["status"][0].code, "oneof");
    }
}
