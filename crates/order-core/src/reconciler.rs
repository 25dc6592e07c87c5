//! # Payment Reconciler
//!
//! Applies asynchronous payment-provider notifications to stored orders.
//! Each write is a single-column overwrite, so duplicated or replayed
//! notifications converge on the same row.

use crate::builder::DEFAULT_STORE_TIMEOUT;
use crate::error::{OrderError, OrderResult};
use crate::gateway::BoxedNotificationVerifier;
use crate::notification::PaymentNotification;
use crate::order::{OrderStatus, ProviderStatus};
use crate::store::{within, OrderStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// What a notification did to its order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub order_id: u64,
    pub transaction_number: String,
    /// Status after the notification was applied
    pub status: OrderStatus,
    /// Whether a status write happened
    pub status_written: bool,
    pub payment_method: String,
}

#[derive(Clone)]
pub struct PaymentReconciler {
    orders: Arc<dyn OrderStore>,
    verifier: Option<BoxedNotificationVerifier>,
    store_timeout: Duration,
}

impl PaymentReconciler {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self {
            orders,
            verifier: None,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Require every notification to pass `verifier` before it is applied
    pub fn with_verifier(mut self, verifier: BoxedNotificationVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Apply one notification.
    ///
    /// Both the status and the payment-method write must succeed; no retry is
    /// attempted here, the provider redelivers until it gets an ack.
    #[instrument(skip(self, notification), fields(transaction = %notification.order_id, status = %notification.transaction_status))]
    pub async fn handle(&self, notification: &PaymentNotification) -> OrderResult<Reconciliation> {
        if let Some(verifier) = &self.verifier {
            verifier.verify(notification).map_err(|e| {
                warn!("Rejected notification for {}: {}", notification.order_id, e);
                e
            })?;
        }

        let limit = self.store_timeout;
        let order = within(
            limit,
            "select order",
            self.orders.select_by_transaction_number(&notification.order_id),
        )
        .await?
        .ok_or(OrderError::not_found("Order"))?;

        let payment_method = notification.payment_method();

        let next = match ProviderStatus::parse(&notification.transaction_status) {
            Some(reported) => {
                let next = order.status.on_provider_status(reported);
                if next.is_none() {
                    info!(
                        "Ignoring '{}' for order {} already in {}",
                        notification.transaction_status, order.id, order.status
                    );
                }
                next
            }
            None => {
                debug!(
                    "Unmapped transaction status '{}', status left as {}",
                    notification.transaction_status, order.status
                );
                None
            }
        };

        if let Some(status) = next {
            within(limit, "update status", self.orders.update_status(order.id, status))
                .await
                .map_err(|e| {
                    error!("Failed to update status of order {}: {}", order.id, e);
                    e
                })?;
        }

        within(
            limit,
            "update payment method",
            self.orders.update_payment_method(order.id, &payment_method),
        )
        .await
        .map_err(|e| {
            error!("Failed to update payment method of order {}: {}", order.id, e);
            e
        })?;

        info!(
            "Reconciled order {}: status={}, payment_method={}",
            order.id,
            next.unwrap_or(order.status),
            payment_method
        );

        Ok(Reconciliation {
            order_id: order.id,
            transaction_number: order.transaction_number,
            status: next.unwrap_or(order.status),
            status_written: next.is_some(),
            payment_method,
        })
    }
}
