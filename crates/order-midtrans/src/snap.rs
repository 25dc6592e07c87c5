//! # Midtrans Snap
//!
//! Opens hosted payment sessions through the Snap transactions API.

use crate::config::MidtransConfig;
use async_trait::async_trait;
use order_core::{
    CustomerDetails, ItemDetail, OrderError, OrderResult, PaymentGateway, PaymentSession,
    SessionRequest,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Snap rejects item names longer than this
const MAX_ITEM_NAME_CHARS: usize = 50;

/// Midtrans Snap gateway
///
/// Authenticates with the server key as the basic-auth user and an empty
/// password.
pub struct SnapGateway {
    config: MidtransConfig,
    client: Client,
}

impl SnapGateway {
    pub fn new(config: MidtransConfig) -> OrderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                OrderError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> OrderResult<Self> {
        Self::new(MidtransConfig::from_env()?)
    }

    pub fn config(&self) -> &MidtransConfig {
        &self.config
    }

    fn build_body(request: &SessionRequest) -> SnapTransactionRequest<'_> {
        SnapTransactionRequest {
            transaction_details: SnapTransactionDetails {
                order_id: &request.transaction_number,
                gross_amount: request.gross_amount,
            },
            customer_details: &request.customer,
            item_details: request.items.iter().map(SnapItem::from).collect(),
        }
    }
}

#[async_trait]
impl PaymentGateway for SnapGateway {
    #[instrument(skip(self, request), fields(transaction = %request.transaction_number))]
    async fn create_session(&self, request: &SessionRequest) -> OrderResult<PaymentSession> {
        let body = Self::build_body(request);
        let url = self.config.snap_transactions_url();

        debug!(
            "Creating Snap transaction: {} items, gross_amount={}",
            body.item_details.len(),
            request.gross_amount
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.server_key, Some(""))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OrderError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OrderError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Midtrans API error: status={}, body={}", status, text);

            if let Ok(error_response) = serde_json::from_str::<SnapErrorResponse>(&text) {
                if !error_response.error_messages.is_empty() {
                    return Err(OrderError::Upstream {
                        provider: self.provider_name().to_string(),
                        message: error_response.error_messages.join("; "),
                    });
                }
            }

            return Err(OrderError::Upstream {
                provider: self.provider_name().to_string(),
                message: format!("HTTP {}: {}", status, text),
            });
        }

        let session: SnapTransactionResponse = serde_json::from_str(&text).map_err(|e| {
            OrderError::Serialization(format!("Failed to parse Midtrans response: {}", e))
        })?;

        info!(
            "Created Snap transaction {}: redirect_url={}",
            request.transaction_number, session.redirect_url
        );

        Ok(PaymentSession {
            token: session.token,
            redirect_url: session.redirect_url,
        })
    }

    fn provider_name(&self) -> &'static str {
        "midtrans"
    }
}

// =============================================================================
// Snap API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct SnapTransactionRequest<'a> {
    transaction_details: SnapTransactionDetails<'a>,
    customer_details: &'a CustomerDetails,
    item_details: Vec<SnapItem>,
}

#[derive(Debug, Serialize)]
struct SnapTransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct SnapItem {
    price: i64,
    quantity: u32,
    name: String,
}

impl From<&ItemDetail> for SnapItem {
    fn from(item: &ItemDetail) -> Self {
        Self {
            price: item.price,
            quantity: item.quantity,
            name: item.name.chars().take(MAX_ITEM_NAME_CHARS).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SnapTransactionResponse {
    token: String,
    redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct SnapErrorResponse {
    #[serde(default)]
    error_messages: Vec<String>,
}
