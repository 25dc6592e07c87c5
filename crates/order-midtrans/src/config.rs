//! # Midtrans Configuration
//!
//! Configuration management for the Midtrans integration.
//! All secrets are loaded from environment variables.

use order_core::OrderError;
use std::env;
use std::time::Duration;

pub const SANDBOX_BASE_URL: &str = "https://app.sandbox.midtrans.com";
pub const PRODUCTION_BASE_URL: &str = "https://app.midtrans.com";

/// Midtrans deployment the keys belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidtransEnvironment {
    Sandbox,
    Production,
}

impl MidtransEnvironment {
    fn base_url(&self) -> &'static str {
        match self {
            MidtransEnvironment::Sandbox => SANDBOX_BASE_URL,
            MidtransEnvironment::Production => PRODUCTION_BASE_URL,
        }
    }

    fn server_key_prefix(&self) -> &'static str {
        match self {
            MidtransEnvironment::Sandbox => "SB-Mid-server-",
            MidtransEnvironment::Production => "Mid-server-",
        }
    }
}

/// Midtrans API configuration
#[derive(Debug, Clone)]
pub struct MidtransConfig {
    /// Server key (SB-Mid-server-... or Mid-server-...)
    pub server_key: String,

    /// Client key handed to the Snap.js widget
    pub client_key: Option<String>,

    pub environment: MidtransEnvironment,

    /// Snap base URL (for testing/mocking)
    pub api_base_url: String,

    /// Upper bound for a single Snap API call
    pub timeout: Duration,

    /// Check `signature_key` on inbound notifications
    pub verify_signatures: bool,
}

impl MidtransConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `MIDTRANS_SERVER_KEY`
    ///
    /// Optional: `MIDTRANS_CLIENT_KEY`, `MIDTRANS_ENVIRONMENT`
    /// (`sandbox`|`production`), `MIDTRANS_TIMEOUT_SECS`,
    /// `MIDTRANS_VERIFY_SIGNATURE`.
    pub fn from_env() -> Result<Self, OrderError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let server_key = env::var("MIDTRANS_SERVER_KEY").map_err(|_| {
            OrderError::Configuration("MIDTRANS_SERVER_KEY not set".to_string())
        })?;

        let environment = match env::var("MIDTRANS_ENVIRONMENT")
            .unwrap_or_else(|_| "sandbox".to_string())
            .as_str()
        {
            "sandbox" => MidtransEnvironment::Sandbox,
            "production" => MidtransEnvironment::Production,
            other => {
                return Err(OrderError::Configuration(format!(
                    "MIDTRANS_ENVIRONMENT must be sandbox or production, got {}",
                    other
                )))
            }
        };

        if !server_key.starts_with(environment.server_key_prefix()) {
            return Err(OrderError::Configuration(format!(
                "MIDTRANS_SERVER_KEY must start with {}",
                environment.server_key_prefix()
            )));
        }

        let timeout = env::var("MIDTRANS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let verify_signatures = env::var("MIDTRANS_VERIFY_SIGNATURE")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Ok(Self {
            server_key,
            client_key: env::var("MIDTRANS_CLIENT_KEY").ok(),
            environment,
            api_base_url: environment.base_url().to_string(),
            timeout,
            verify_signatures,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(server_key: impl Into<String>, environment: MidtransEnvironment) -> Self {
        Self {
            server_key: server_key.into(),
            client_key: None,
            environment,
            api_base_url: environment.base_url().to_string(),
            timeout: Duration::from_secs(30),
            verify_signatures: true,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == MidtransEnvironment::Production
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn snap_transactions_url(&self) -> String {
        format!("{}/snap/v1/transactions", self.api_base_url.trim_end_matches('/'))
    }
}
