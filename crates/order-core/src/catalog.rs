//! # Catalog Types
//!
//! Read-only records owned by upstream subsystems (users, profiles, checkouts,
//! carts, products, addresses). The order workflow only ever reads them.

use serde::{Deserialize, Serialize};

/// Account role, used to pick the profile a user's contact details live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seller,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seller => "seller",
            Role::Customer => "customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marketplace account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub role: Role,
}

/// Display name and phone taken from a role-specific profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

/// A priced snapshot of a user's cart awaiting order creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub id: u64,
    pub user_id: u64,
    /// Delivery fee in smallest currency unit
    pub delivery: i64,
    /// Expected grand total (items + delivery)
    pub summary: i64,
}

/// A line in the cart referenced by a checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u64,
    pub checkout_id: u64,
    pub product_id: u64,
    pub quantity: u32,
}

/// A product as currently listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    /// Unit price in smallest currency unit
    pub price: i64,
}

impl Product {
    /// Line total for `quantity` units, `None` on overflow
    pub fn line_total(&self, quantity: u32) -> Option<i64> {
        self.price.checked_mul(i64::from(quantity))
    }
}

/// A delivery address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub phone: String,
    pub main_address: String,
    pub city: String,
    pub postal_code: String,
}
