//! # Store Contracts
//!
//! Ports to durable storage. The order store is the only shared mutable
//! resource; every other store is a read-only lookup owned upstream.

use crate::catalog::{Address, CartItem, Checkout, Contact, Product, Role, User};
use crate::error::{OrderError, OrderResult};
use crate::order::{Order, OrderStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn select_all(&self) -> OrderResult<Vec<Order>>;
    async fn select_by_user(&self, user_id: u64) -> OrderResult<Vec<Order>>;
    async fn select_by_id(&self, id: u64) -> OrderResult<Option<Order>>;
    async fn select_by_transaction_number(&self, number: &str) -> OrderResult<Option<Order>>;

    /// Insert and return the stored row with its assigned id.
    ///
    /// Fails when the user or checkout is absent or when the transaction
    /// number is already taken.
    async fn create(&self, order: Order) -> OrderResult<Order>;

    /// Overwrite the status column
    async fn update_status(&self, id: u64, status: OrderStatus) -> OrderResult<()>;

    /// Overwrite the payment method column
    async fn update_payment_method(&self, id: u64, method: &str) -> OrderResult<()>;

    async fn delete(&self, id: u64) -> OrderResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user(&self, id: u64) -> OrderResult<Option<User>>;
}

#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// A checkout only if it belongs to `user_id`
    async fn checkout_for_user(&self, id: u64, user_id: u64) -> OrderResult<Option<Checkout>>;
    async fn cart_items(&self, checkout_id: u64) -> OrderResult<Vec<CartItem>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn product(&self, id: u64) -> OrderResult<Option<Product>>;
}

#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn address(&self, id: u64) -> OrderResult<Option<Address>>;
}

/// Contact lookup for one role's profile table
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    fn role(&self) -> Role;
    async fn contact(&self, user_id: u64) -> OrderResult<Option<Contact>>;
}

pub type BoxedProfileProvider = Arc<dyn ProfileProvider>;

/// Role-keyed registry of profile providers
#[derive(Clone, Default)]
pub struct ProfileDirectory {
    providers: HashMap<Role, BoxedProfileProvider>,
}

impl ProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own role, replacing any previous one
    pub fn register(&mut self, provider: BoxedProfileProvider) {
        self.providers.insert(provider.role(), provider);
    }

    pub fn with_provider(mut self, provider: BoxedProfileProvider) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, role: Role) -> Option<&BoxedProfileProvider> {
        self.providers.get(&role)
    }

    /// Contact for a user under the given role; `None` when no provider is
    /// registered or the profile row is missing
    pub async fn contact(&self, role: Role, user_id: u64) -> OrderResult<Option<Contact>> {
        match self.get(role) {
            Some(provider) => provider.contact(user_id).await,
            None => Ok(None),
        }
    }
}

/// Every store the order workflow reads from or writes to
#[derive(Clone)]
pub struct Stores {
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
    pub checkouts: Arc<dyn CheckoutStore>,
    pub products: Arc<dyn ProductStore>,
    pub addresses: Arc<dyn AddressStore>,
    pub profiles: ProfileDirectory,
}

/// Bound a store call so a stalled backend surfaces as a failure
pub async fn within<T, F>(limit: Duration, operation: &'static str, call: F) -> OrderResult<T>
where
    F: Future<Output = OrderResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(OrderError::Timeout {
            operation,
            millis: limit.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProfile(Role);

    #[async_trait]
    impl ProfileProvider for FixedProfile {
        fn role(&self) -> Role {
            self.0
        }

        async fn contact(&self, user_id: u64) -> OrderResult<Option<Contact>> {
            Ok(Some(Contact {
                name: format!("{}-{}", self.0, user_id),
                phone: "0800".into(),
            }))
        }
    }

    #[tokio::test]
    async fn test_directory_routes_by_role() {
        let directory = ProfileDirectory::new()
            .with_provider(Arc::new(FixedProfile(Role::Seller)))
            .with_provider(Arc::new(FixedProfile(Role::Customer)));

        let seller = directory.contact(Role::Seller, 9).await.unwrap().unwrap();
        assert_eq!(seller.name, "seller-9");

        let customer = directory.contact(Role::Customer, 9).await.unwrap().unwrap();
        assert_eq!(customer.name, "customer-9");
    }

    #[tokio::test]
    async fn test_directory_without_provider() {
        let directory = ProfileDirectory::new();
        assert!(directory.contact(Role::Seller, 1).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_within_reports_timeout() {
        let stalled = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, OrderError>(())
        };

        let err = within(Duration::from_secs(1), "select order", stalled)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Timeout { operation: "select order", millis: 1000 }));
        assert_eq!(err.status_code(), 500);
    }
}
