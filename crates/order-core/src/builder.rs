//! # Order Builder
//!
//! Turns a checkout into an order: recomputes the price from current cart and
//! product state, cross-checks it against the checkout summary, opens a
//! payment session and only then persists the order.
//!
//! ```text
//! user ─► checkout ─► cart lines ─► products ─► total == summary?
//!                                                   │
//!          persist ◄── payment session ◄── validate ┘
//! ```

use crate::catalog::Contact;
use crate::error::{FieldError, OrderError, OrderResult};
use crate::gateway::{BoxedPaymentGateway, CustomerDetails, ItemDetail, PaymentSession, SessionRequest};
use crate::order::{generate_transaction_number, NewOrderRequest, Order};
use crate::sanitize::Sanitize;
use crate::store::{within, Stores};
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use validator::Validate;

/// Default deadline for a single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// A persisted order with the session the client must complete
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub session: PaymentSession,
}

/// Result of a create-order request
#[derive(Debug, Clone)]
pub enum CreateOrderOutcome {
    Created(PlacedOrder),
    /// The checkout has no cart lines; nothing was written
    EmptyCart,
}

#[derive(Clone)]
pub struct OrderBuilder {
    stores: Stores,
    gateway: BoxedPaymentGateway,
    store_timeout: Duration,
}

impl OrderBuilder {
    pub fn new(stores: Stores, gateway: BoxedPaymentGateway) -> Self {
        Self {
            stores,
            gateway,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Create an order for `user_id` from the checkout named in `request`.
    ///
    /// All-or-nothing from the caller's side: no order is written unless the
    /// payment session was opened, and nothing touches the provider unless
    /// the recomputed total matches the checkout.
    #[instrument(skip(self, request), fields(checkout_id = request.checkout_id))]
    pub async fn create_order(
        &self,
        user_id: u64,
        request: NewOrderRequest,
    ) -> OrderResult<CreateOrderOutcome> {
        let limit = self.store_timeout;

        let user = within(limit, "select user", self.stores.users.user(user_id))
            .await?
            .ok_or(OrderError::not_found("User"))?;

        let transaction_number = generate_transaction_number();

        let checkout = within(
            limit,
            "select checkout",
            self.stores.checkouts.checkout_for_user(request.checkout_id, user.id),
        )
        .await?
        .ok_or(OrderError::not_found("Checkout"))?;

        let carts = within(limit, "select cart", self.stores.checkouts.cart_items(checkout.id)).await?;
        if carts.is_empty() {
            info!("Checkout {} has an empty cart, nothing to order", checkout.id);
            return Ok(CreateOrderOutcome::EmptyCart);
        }

        let mut items = Vec::with_capacity(carts.len());
        let mut total: i64 = 0;
        for cart in &carts {
            let product = within(limit, "select product", self.stores.products.product(cart.product_id))
                .await?
                .ok_or(OrderError::not_found("Product"))?;

            total = product
                .line_total(cart.quantity)
                .and_then(|line| total.checked_add(line))
                .ok_or_else(total_overflow)?;
            items.push(ItemDetail::from_product(&product, cart.quantity));
        }
        total = total.checked_add(checkout.delivery).ok_or_else(total_overflow)?;
        // Provider requires the item lines to add up to the gross amount
        if checkout.delivery > 0 {
            items.push(ItemDetail::delivery(checkout.delivery));
        }

        if total != checkout.summary {
            warn!(
                "Price mismatch on checkout {}: computed={}, summary={}",
                checkout.id, total, checkout.summary
            );
            return Err(OrderError::PriceMismatch {
                computed: total,
                expected: checkout.summary,
            });
        }

        let order = Order::awaiting_payment(user.id, &request, transaction_number, total).sanitized();
        order.validate()?;

        let contact = match within(
            limit,
            "select profile",
            self.stores.profiles.contact(user.role, user.id),
        )
        .await?
        {
            Some(contact) => contact,
            None => {
                warn!("No {} profile for user {}, sending empty contact", user.role, user.id);
                Contact::default()
            }
        };

        let address = within(limit, "select address", self.stores.addresses.address(order.address_id))
            .await?
            .ok_or(OrderError::not_found("Address"))?;

        let session_request = SessionRequest {
            transaction_number: order.transaction_number.clone(),
            gross_amount: total,
            customer: CustomerDetails::new(contact, user.email.clone(), &address),
            items,
        };

        let session = self
            .gateway
            .create_session(&session_request)
            .await
            .map_err(|e| {
                error!(
                    "Failed to create {} session for {}: {}",
                    self.gateway.provider_name(),
                    order.transaction_number,
                    e
                );
                e
            })?;

        let order = within(limit, "create order", self.stores.orders.create(order))
            .await
            .map_err(|e| {
                // The provider session stays open with no matching order.
                error!(
                    "Failed to persist order {} after session was opened: {}",
                    session_request.transaction_number, e
                );
                e
            })?;

        info!(
            "Created order {} ({}), total={}",
            order.id, order.transaction_number, order.total_price
        );

        Ok(CreateOrderOutcome::Created(PlacedOrder { order, session }))
    }
}

fn total_overflow() -> OrderError {
    OrderError::Validation {
        errors: vec![FieldError::new(
            "total_price",
            "overflow",
            "total_price exceeds the supported range",
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Address, CartItem, Checkout, Product, Role, User};
    use crate::gateway::{PaymentGateway, DELIVERY_ITEM_NAME};
    use crate::memory::{Fixtures, MemoryStore, ProfileRecord};
    use crate::order::OrderStatus;
    use crate::store::OrderStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingGateway {
        calls: AtomicUsize,
        last: Mutex<Option<SessionRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_session(&self, request: &SessionRequest) -> OrderResult<PaymentSession> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            if self.fail {
                return Err(OrderError::Upstream {
                    provider: "fake".into(),
                    message: "gateway down".into(),
                });
            }
            Ok(PaymentSession {
                token: format!("tok-{}", request.transaction_number),
                redirect_url: "https://pay.example/redirect".into(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }
    }

    fn fixtures(summary: i64) -> Fixtures {
        Fixtures {
            users: vec![User {
                id: 1,
                email: "buyer@example.com".into(),
                role: Role::Customer,
            }],
            profiles: vec![ProfileRecord {
                user_id: 1,
                role: Role::Customer,
                name: "Budi".into(),
                phone: "0811".into(),
            }],
            addresses: vec![Address {
                id: 5,
                user_id: 1,
                name: "Rumah".into(),
                phone: "0811".into(),
                main_address: "Jl. Sudirman 2".into(),
                city: "Jakarta".into(),
                postal_code: "10220".into(),
            }],
            products: vec![
                Product {
                    id: 100,
                    name: "Kopi Gayo".into(),
                    price: 50_000,
                },
                Product {
                    id: 101,
                    name: "Teh Tarik".into(),
                    price: 20_000,
                },
            ],
            checkouts: vec![
                Checkout {
                    id: 10,
                    user_id: 1,
                    delivery: 15_000,
                    summary,
                },
                Checkout {
                    id: 11,
                    user_id: 1,
                    delivery: 0,
                    summary: 0,
                },
            ],
            cart_items: vec![
                CartItem {
                    id: 1,
                    checkout_id: 10,
                    product_id: 100,
                    quantity: 2,
                },
                CartItem {
                    id: 2,
                    checkout_id: 10,
                    product_id: 101,
                    quantity: 1,
                },
            ],
        }
    }

    const MATCHING_SUMMARY: i64 = 2 * 50_000 + 20_000 + 15_000;

    fn builder(store: &MemoryStore, gateway: Arc<RecordingGateway>) -> OrderBuilder {
        OrderBuilder::new(store.stores(), gateway)
    }

    fn request(checkout_id: u64) -> NewOrderRequest {
        NewOrderRequest {
            checkout_id,
            address_id: 5,
        }
    }

    #[tokio::test]
    async fn test_create_order_success() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY));
        let gateway = Arc::new(RecordingGateway::default());

        let outcome = builder(&store, gateway.clone())
            .create_order(1, request(10))
            .await
            .unwrap();

        let placed = match outcome {
            CreateOrderOutcome::Created(placed) => placed,
            other => panic!("expected created, got {:?}", other),
        };
        assert_eq!(placed.order.total_price, MATCHING_SUMMARY);
        assert_eq!(placed.session.token, format!("tok-{}", placed.order.transaction_number));

        let stored = store
            .select_by_transaction_number(&placed.order.transaction_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, OrderStatus::AwaitingPayment);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

        let sent = gateway.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.gross_amount, MATCHING_SUMMARY);
        assert_eq!(sent.items.len(), 3);
        assert_eq!(sent.items[2], ItemDetail::delivery(15_000));
        assert_eq!(sent.customer.first_name, "Budi");
        assert_eq!(sent.customer.email, "buyer@example.com");
        assert_eq!(sent.customer.billing_address, sent.customer.shipping_address);
        assert_eq!(sent.customer.shipping_address.city, "Jakarta");
    }

    #[tokio::test]
    async fn test_items_add_up_to_gross_amount() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY));
        let gateway = Arc::new(RecordingGateway::default());

        builder(&store, gateway.clone())
            .create_order(1, request(10))
            .await
            .unwrap();

        let sent = gateway.last.lock().unwrap().clone().unwrap();
        let items_total: i64 = sent
            .items
            .iter()
            .map(|item| item.price * i64::from(item.quantity))
            .sum();
        assert_eq!(items_total, sent.gross_amount);
    }

    #[tokio::test]
    async fn test_free_delivery_adds_no_line() {
        let mut fixtures = fixtures(0);
        fixtures.checkouts[0].delivery = 0;
        fixtures.checkouts[0].summary = 2 * 50_000 + 20_000;
        let store = MemoryStore::from_fixtures(fixtures);
        let gateway = Arc::new(RecordingGateway::default());

        builder(&store, gateway.clone())
            .create_order(1, request(10))
            .await
            .unwrap();

        let sent = gateway.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.items.len(), 2);
        assert!(sent.items.iter().all(|item| item.name != DELIVERY_ITEM_NAME));
    }

    #[tokio::test]
    async fn test_price_mismatch_writes_nothing() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY - 1));
        let gateway = Arc::new(RecordingGateway::default());

        let err = builder(&store, gateway.clone())
            .create_order(1, request(10))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrderError::PriceMismatch {
                computed: MATCHING_SUMMARY,
                expected: _
            }
        ));
        assert!(err.is_validation());
        assert_eq!(store.order_count().await, 0);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_product_price_is_rejected() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY));
        store
            .insert_product(Product {
                id: 101,
                name: "Teh Tarik".into(),
                price: 25_000,
            })
            .await;
        let gateway = Arc::new(RecordingGateway::default());

        let err = builder(&store, gateway.clone())
            .create_order(1, request(10))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::PriceMismatch { .. }));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_cart_is_no_content() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY));
        let gateway = Arc::new(RecordingGateway::default());

        let outcome = builder(&store, gateway.clone())
            .create_order(1, request(11))
            .await
            .unwrap();

        assert!(matches!(outcome, CreateOrderOutcome::EmptyCart));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_entities_are_not_found() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY));
        let gateway = Arc::new(RecordingGateway::default());
        let builder = builder(&store, gateway.clone());

        let err = builder.create_order(42, request(10)).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound { entity: "User" }));

        let err = builder.create_order(1, request(99)).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound { entity: "Checkout" }));

        store.remove_product(100).await;
        let err = builder.create_order(1, request(10)).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound { entity: "Product" }));

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_address_is_not_found() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY));
        let gateway = Arc::new(RecordingGateway::default());

        let err = builder(&store, gateway.clone())
            .create_order(
                1,
                NewOrderRequest {
                    checkout_id: 10,
                    address_id: 77,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::NotFound { entity: "Address" }));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_address_id_fails_validation() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY));
        let gateway = Arc::new(RecordingGateway::default());

        let err = builder(&store, gateway.clone())
            .create_order(
                1,
                NewOrderRequest {
                    checkout_id: 10,
                    address_id: 0,
                },
            )
            .await
            .unwrap_err();

        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "address_id");
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_no_order() {
        let store = MemoryStore::from_fixtures(fixtures(MATCHING_SUMMARY));
        let gateway = Arc::new(RecordingGateway {
            fail: true,
            ..RecordingGateway::default()
        });

        let err = builder(&store, gateway.clone())
            .create_order(1, request(10))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Upstream { .. }));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_profile_degrades_to_empty_contact() {
        let mut seed = fixtures(MATCHING_SUMMARY);
        seed.profiles.clear();
        let store = MemoryStore::from_fixtures(seed);
        let gateway = Arc::new(RecordingGateway::default());

        builder(&store, gateway.clone())
            .create_order(1, request(10))
            .await
            .unwrap();

        let sent = gateway.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.customer.first_name, "");
        assert_eq!(sent.customer.email, "buyer@example.com");
    }
}
