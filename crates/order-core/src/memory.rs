//! # In-Memory Stores
//!
//! A thread-safe, process-local implementation of every store contract.
//! Used by the server when no database is wired in, and by tests.

use crate::catalog::{Address, CartItem, Checkout, Contact, Product, Role, User};
use crate::error::{OrderError, OrderResult};
use crate::order::{Order, OrderStatus};
use crate::store::{
    AddressStore, CheckoutStore, OrderStore, ProductStore, ProfileDirectory, ProfileProvider,
    Stores, UserStore,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A seller or customer profile row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: u64,
    pub role: Role,
    pub name: String,
    pub phone: String,
}

/// Seed data for the in-memory store (loaded from `config/fixtures.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub checkouts: Vec<Checkout>,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<u64, User>,
    profiles: HashMap<(Role, u64), Contact>,
    addresses: HashMap<u64, Address>,
    products: HashMap<u64, Product>,
    checkouts: HashMap<u64, Checkout>,
    cart_items: Vec<CartItem>,
    orders: BTreeMap<u64, Order>,
    last_order_id: u64,
}

/// Every table behind one `Arc<RwLock<..>>`, so clones share state
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        let mut tables = Tables::default();
        tables.users = fixtures.users.into_iter().map(|u| (u.id, u)).collect();
        tables.profiles = fixtures
            .profiles
            .into_iter()
            .map(|p| {
                (
                    (p.role, p.user_id),
                    Contact {
                        name: p.name,
                        phone: p.phone,
                    },
                )
            })
            .collect();
        tables.addresses = fixtures.addresses.into_iter().map(|a| (a.id, a)).collect();
        tables.products = fixtures.products.into_iter().map(|p| (p.id, p)).collect();
        tables.checkouts = fixtures.checkouts.into_iter().map(|c| (c.id, c)).collect();
        tables.cart_items = fixtures.cart_items;

        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Profile provider for one role, sharing this store's tables
    pub fn profiles(&self, role: Role) -> MemoryProfiles {
        MemoryProfiles {
            role,
            tables: Arc::clone(&self.tables),
        }
    }

    /// Directory with both seller and customer profiles registered
    pub fn profile_directory(&self) -> ProfileDirectory {
        ProfileDirectory::new()
            .with_provider(Arc::new(self.profiles(Role::Seller)))
            .with_provider(Arc::new(self.profiles(Role::Customer)))
    }

    /// All store contracts backed by this one instance
    pub fn stores(&self) -> Stores {
        Stores {
            orders: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
            checkouts: Arc::new(self.clone()),
            products: Arc::new(self.clone()),
            addresses: Arc::new(self.clone()),
            profiles: self.profile_directory(),
        }
    }

    pub async fn insert_product(&self, product: Product) {
        self.tables.write().await.products.insert(product.id, product);
    }

    pub async fn remove_product(&self, id: u64) {
        self.tables.write().await.products.remove(&id);
    }

    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn select_all(&self) -> OrderResult<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.values().cloned().collect())
    }

    async fn select_by_user(&self, user_id: u64) -> OrderResult<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn select_by_id(&self, id: u64) -> OrderResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(&id).cloned())
    }

    async fn select_by_transaction_number(&self, number: &str) -> OrderResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .find(|o| o.transaction_number == number)
            .cloned())
    }

    async fn create(&self, mut order: Order) -> OrderResult<Order> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&order.user_id) {
            return Err(OrderError::Persistence(format!(
                "user {} does not exist",
                order.user_id
            )));
        }
        if !tables.checkouts.contains_key(&order.checkout_id) {
            return Err(OrderError::Persistence(format!(
                "checkout {} does not exist",
                order.checkout_id
            )));
        }
        if tables
            .orders
            .values()
            .any(|o| o.transaction_number == order.transaction_number)
        {
            return Err(OrderError::Persistence(format!(
                "duplicate transaction number {}",
                order.transaction_number
            )));
        }

        tables.last_order_id += 1;
        order.id = tables.last_order_id;
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_status(&self, id: u64, status: OrderStatus) -> OrderResult<()> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| OrderError::Persistence(format!("order {} does not exist", id)))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn update_payment_method(&self, id: u64, method: &str) -> OrderResult<()> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| OrderError::Persistence(format!("order {} does not exist", id)))?;
        order.payment_method = Some(method.to_string());
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: u64) -> OrderResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| OrderError::Persistence(format!("order {} does not exist", id)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn user(&self, id: u64) -> OrderResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl CheckoutStore for MemoryStore {
    async fn checkout_for_user(&self, id: u64, user_id: u64) -> OrderResult<Option<Checkout>> {
        let tables = self.tables.read().await;
        Ok(tables
            .checkouts
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn cart_items(&self, checkout_id: u64) -> OrderResult<Vec<CartItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart_items
            .iter()
            .filter(|c| c.checkout_id == checkout_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn product(&self, id: u64) -> OrderResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn address(&self, id: u64) -> OrderResult<Option<Address>> {
        Ok(self.tables.read().await.addresses.get(&id).cloned())
    }
}

/// Profile rows for a single role
#[derive(Clone)]
pub struct MemoryProfiles {
    role: Role,
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl ProfileProvider for MemoryProfiles {
    fn role(&self) -> Role {
        self.role
    }

    async fn contact(&self, user_id: u64) -> OrderResult<Option<Contact>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(&(self.role, user_id)).cloned())
    }
}
