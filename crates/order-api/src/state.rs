//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the order workflows, the token verifier and configuration.

use crate::auth::JwtVerifier;
use anyhow::Context;
use order_core::{
    BoxedNotificationVerifier, BoxedPaymentGateway, Fixtures, MemoryStore, OrderBuilder,
    OrderManager, PaymentReconciler, Stores, DEFAULT_STORE_TIMEOUT,
};
use order_midtrans::{MidtransConfig, SignatureVerifier, SnapGateway};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// HS256 secret for access tokens
    pub jwt_secret: String,
    /// Deadline for a single store call
    pub store_timeout: Duration,
    /// Seed data file; the default search paths are used when unset
    pub fixtures_path: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            store_timeout: std::env::var("STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_STORE_TIMEOUT),
            fixtures_path: std::env::var("FIXTURES_PATH").ok(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub builder: OrderBuilder,
    pub reconciler: PaymentReconciler,
    pub manager: OrderManager,
    pub auth: JwtVerifier,
    /// Name of the configured payment provider
    pub provider: &'static str,
    /// Whether notifications are signature-checked
    pub verifies_notifications: bool,
    pub config: AppConfig,
}

impl AppState {
    /// Create AppState from the environment: fixtures-backed store and the
    /// Midtrans gateway
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        if config.jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET not set");
        }

        let fixtures = load_fixtures(config.fixtures_path.as_deref())?;
        let store = MemoryStore::from_fixtures(fixtures);

        let midtrans = MidtransConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Midtrans: {}", e))?;
        let verifier = midtrans
            .verify_signatures
            .then(|| Arc::new(SignatureVerifier::from_config(&midtrans)) as BoxedNotificationVerifier);
        let gateway = SnapGateway::new(midtrans)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Midtrans: {}", e))?;

        Ok(Self::from_parts(
            config,
            store.stores(),
            Arc::new(gateway),
            verifier,
        ))
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        config: AppConfig,
        stores: Stores,
        gateway: BoxedPaymentGateway,
        verifier: Option<BoxedNotificationVerifier>,
    ) -> Self {
        let timeout = config.store_timeout;
        let provider = gateway.provider_name();
        let verifies_notifications = verifier.is_some();

        let mut reconciler =
            PaymentReconciler::new(stores.orders.clone()).with_store_timeout(timeout);
        if let Some(verifier) = verifier {
            reconciler = reconciler.with_verifier(verifier);
        }

        Self {
            manager: OrderManager::new(stores.orders.clone()).with_store_timeout(timeout),
            builder: OrderBuilder::new(stores, gateway).with_store_timeout(timeout),
            reconciler,
            auth: JwtVerifier::new(&config.jwt_secret),
            provider,
            verifies_notifications,
            config,
        }
    }
}

/// Load seed data from a fixtures file
fn load_fixtures(explicit: Option<&str>) -> anyhow::Result<Fixtures> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))?;
        return parse_fixtures(&content, path);
    }

    // Try to load from config/fixtures.toml
    let config_paths = [
        "config/fixtures.toml",
        "../config/fixtures.toml",
        "../../config/fixtures.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_fixtures(&content, path);
        }
    }

    tracing::warn!("No fixtures found, starting with an empty store");
    Ok(Fixtures::default())
}

fn parse_fixtures(content: &str, path: &str) -> anyhow::Result<Fixtures> {
    let fixtures: Fixtures =
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!(
        "Loaded {} users, {} checkouts, {} products from {}",
        fixtures.users.len(),
        fixtures.checkouts.len(),
        fixtures.products.len(),
        path
    );
    Ok(fixtures)
}
