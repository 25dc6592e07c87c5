//! # order-api
//!
//! HTTP API layer for marketplace-orders-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for creating, listing, updating and deleting orders
//! - The payment-notification webhook
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/orders` | List orders |
//! | POST | `/api/v1/orders` | Create order |
//! | GET | `/api/v1/orders/me` | List own orders |
//! | PUT | `/api/v1/orders/{id}/status` | Update order status (seller) |
//! | DELETE | `/api/v1/orders/{id}` | Delete order |
//! | POST | `/webhook/midtrans` | Midtrans notification |

pub mod auth;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use auth::{Claims, JwtVerifier};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
