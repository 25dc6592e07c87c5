//! # order-core
//!
//! Core types and workflows for marketplace order management.
//!
//! This crate provides:
//! - `OrderBuilder`: checkout → price check → payment session → persisted order
//! - `PaymentReconciler`: provider notifications → order status state machine
//! - `OrderManager`: listing, deletion and the seller's manual status update
//! - `PaymentGateway` / `NotificationVerifier` traits for payment providers
//! - Store traits plus an in-memory implementation
//! - `OrderError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use order_core::{MemoryStore, NewOrderRequest, OrderBuilder, CreateOrderOutcome};
//!
//! let store = MemoryStore::from_fixtures(fixtures);
//! let builder = OrderBuilder::new(store.stores(), gateway);
//!
//! match builder.create_order(user_id, NewOrderRequest { checkout_id: 10, address_id: 5 }).await? {
//!     CreateOrderOutcome::Created(placed) => redirect(placed.session.redirect_url),
//!     CreateOrderOutcome::EmptyCart => {}
//! }
//! ```

pub mod builder;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod manager;
pub mod memory;
pub mod notification;
pub mod order;
pub mod reconciler;
pub mod sanitize;
pub mod store;

// Re-exports for convenience
pub use builder::{CreateOrderOutcome, OrderBuilder, PlacedOrder, DEFAULT_STORE_TIMEOUT};
pub use catalog::{Address, CartItem, Checkout, Contact, Product, Role, User};
pub use error::{FieldError, OrderError, OrderResult};
pub use gateway::{
    BoxedNotificationVerifier, BoxedPaymentGateway, CustomerAddress, CustomerDetails, ItemDetail,
    NotificationVerifier, PaymentGateway, PaymentSession, SessionRequest, DELIVERY_ITEM_NAME,
};
pub use manager::OrderManager;
pub use memory::{Fixtures, MemoryProfiles, MemoryStore, ProfileRecord};
pub use notification::{PaymentNotification, VaNumber};
pub use order::{
    generate_transaction_number, NewOrderRequest, Order, OrderStatus, ProviderStatus,
    StatusUpdateRequest, MANUAL_STATUS_VOCABULARY,
};
pub use reconciler::{PaymentReconciler, Reconciliation};
pub use sanitize::{escape_html, Sanitize};
pub use store::{
    AddressStore, BoxedProfileProvider, CheckoutStore, OrderStore, ProductStore,
    ProfileDirectory, ProfileProvider, Stores, UserStore,
};
