//! # Order Manager
//!
//! Listing, deletion and the seller-driven manual status transition.

use crate::builder::DEFAULT_STORE_TIMEOUT;
use crate::error::{OrderError, OrderResult};
use crate::order::{Order, OrderStatus, StatusUpdateRequest};
use crate::sanitize::Sanitize;
use crate::store::{within, OrderStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use validator::Validate;

#[derive(Clone)]
pub struct OrderManager {
    orders: Arc<dyn OrderStore>,
    store_timeout: Duration,
}

impl OrderManager {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self {
            orders,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn list_all(&self) -> OrderResult<Vec<Order>> {
        within(self.store_timeout, "select orders", self.orders.select_all()).await
    }

    pub async fn list_for_user(&self, user_id: u64) -> OrderResult<Vec<Order>> {
        within(
            self.store_timeout,
            "select orders",
            self.orders.select_by_user(user_id),
        )
        .await
    }

    /// First half of a manual status update: the order must exist, belong to
    /// `actor_id` and already be paid (or further along).
    ///
    /// Runs before the request body is even parsed, so a non-owner is always
    /// forbidden whatever they send.
    #[instrument(skip(self))]
    pub async fn authorize_status_change(&self, actor_id: u64, order_id: u64) -> OrderResult<Order> {
        let order = within(
            self.store_timeout,
            "select order",
            self.orders.select_by_id(order_id),
        )
        .await?
        .ok_or(OrderError::not_found("Order"))?;

        if !order.is_owned_by(actor_id) {
            warn!("User {} tried to update order {} they do not own", actor_id, order.id);
            return Err(OrderError::Forbidden("This order is not same user".to_string()));
        }

        if !order.status.accepts_manual_update() {
            return Err(OrderError::Forbidden(
                "This order should already paid".to_string(),
            ));
        }

        Ok(order)
    }

    /// Second half: sanitize and validate the requested status, then write it
    #[instrument(skip(self, order, request), fields(order_id = order.id))]
    pub async fn apply_status_change(
        &self,
        order: &Order,
        request: StatusUpdateRequest,
    ) -> OrderResult<OrderStatus> {
        let request = request.sanitized();
        request.validate()?;
        let status = request
            .target()
            .ok_or_else(|| OrderError::InvalidRequest("Unknown status".to_string()))?;

        within(
            self.store_timeout,
            "update status",
            self.orders.update_status(order.id, status),
        )
        .await
        .map_err(|e| {
            error!("Failed to update status of order {}: {}", order.id, e);
            e
        })?;

        info!("Order {} moved from {} to {}", order.id, order.status, status);
        Ok(status)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, order_id: u64) -> OrderResult<()> {
        let order = within(
            self.store_timeout,
            "select order",
            self.orders.select_by_id(order_id),
        )
        .await?
        .ok_or(OrderError::not_found("Order"))?;

        within(self.store_timeout, "delete order", self.orders.delete(order.id))
            .await
            .map_err(|e| {
                error!("Failed to delete order {}: {}", order.id, e);
                e
            })?;

        info!("Deleted order {} ({})", order.id, order.transaction_number);
        Ok(())
    }
}
