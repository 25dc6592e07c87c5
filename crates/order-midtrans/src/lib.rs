//! # order-midtrans
//!
//! Midtrans payment gateway for marketplace-orders-rs.
//!
//! - **SnapGateway** opens hosted Snap payment sessions and implements
//!   `order_core::PaymentGateway`.
//! - **SignatureVerifier** checks the SHA512 `signature_key` on HTTP
//!   notifications and implements `order_core::NotificationVerifier`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use order_midtrans::{MidtransConfig, SignatureVerifier, SnapGateway};
//!
//! let config = MidtransConfig::from_env()?;
//! let verifier = SignatureVerifier::from_config(&config);
//! let gateway = SnapGateway::new(config)?;
//!
//! let session = gateway.create_session(&request).await?;
//! // Hand session.token to Snap.js, or redirect to session.redirect_url
//! ```

pub mod config;
pub mod notification;
pub mod snap;

// Re-exports
pub use config::{MidtransConfig, MidtransEnvironment};
pub use notification::{compute_signature, SignatureVerifier};
pub use snap::SnapGateway;
