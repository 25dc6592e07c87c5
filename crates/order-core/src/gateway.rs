//! # Payment Gateway Trait
//!
//! Seam between the order workflow and the external payment provider.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          PaymentGateway (trait)             │
//! │  ├── create_session()                       │
//! │  └── provider_name()                        │
//! └─────────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴───────┐       ┌───────┴───────┐
//!  │  SnapGateway  │       │ test doubles  │
//!  │  (midtrans)   │       │               │
//!  └───────────────┘       └───────────────┘
//! ```
//!
//! The gateway is passed into the order builder at construction time rather
//! than reached through a process-wide client.

use crate::catalog::{Address, Contact, Product};
use crate::error::OrderResult;
use crate::notification::PaymentNotification;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Billing/shipping address as the provider wants it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub first_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

impl From<&Address> for CustomerAddress {
    fn from(address: &Address) -> Self {
        Self {
            first_name: address.name.clone(),
            phone: address.phone.clone(),
            address: address.main_address.clone(),
            city: address.city.clone(),
            postal_code: address.postal_code.clone(),
        }
    }
}

/// Buyer details attached to a payment session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub billing_address: CustomerAddress,
    pub shipping_address: CustomerAddress,
}

impl CustomerDetails {
    /// Billing and shipping are both the resolved delivery address
    pub fn new(contact: Contact, email: impl Into<String>, address: &Address) -> Self {
        let address = CustomerAddress::from(address);
        Self {
            first_name: contact.name,
            email: email.into(),
            phone: contact.phone,
            billing_address: address.clone(),
            shipping_address: address,
        }
    }
}

/// A priced line sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub name: String,
    pub price: i64,
    pub quantity: u32,
}

/// Name of the line that carries the checkout's delivery fee
pub const DELIVERY_ITEM_NAME: &str = "Delivery";

impl ItemDetail {
    /// Delivery fee as a single line
    pub fn delivery(fee: i64) -> Self {
        Self {
            name: DELIVERY_ITEM_NAME.to_string(),
            price: fee,
            quantity: 1,
        }
    }

    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            quantity,
        }
    }
}

/// Everything the provider needs to open a payment session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub transaction_number: String,
    pub gross_amount: i64,
    pub customer: CustomerDetails,
    pub items: Vec<ItemDetail>,
}

/// A payment session opened by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Token the client-side widget consumes
    pub token: String,
    /// Hosted payment page
    pub redirect_url: String,
}

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment session for an order that has not been persisted yet.
    ///
    /// Not idempotent: every call may create a provider-side session.
    async fn create_session(&self, request: &SessionRequest) -> OrderResult<PaymentSession>;

    /// Get the provider name (for logging and error reporting).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Authenticity check for inbound payment notifications
pub trait NotificationVerifier: Send + Sync {
    fn verify(&self, notification: &PaymentNotification) -> OrderResult<()>;
}

pub type BoxedNotificationVerifier = Arc<dyn NotificationVerifier>;
