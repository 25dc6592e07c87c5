//! # Response Envelopes
//!
//! Every body is `{status, statusCode, ...}`; `statusCode` usually mirrors the
//! HTTP status, except the "no content" envelope which is sent with 200.

use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use order_core::{FieldError, Order, OrderError, OrderStatus};
use serde::Serialize;

/// Status/message envelope, also used for acknowledgements
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
}

impl MessageResponse {
    pub fn new(status: &'static str, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            status_code,
            message: message.into(),
        }
    }

    /// HTTP 200 carrying a 202 body code
    pub fn no_content(message: impl Into<String>) -> Self {
        Self::new("no content", 202, message)
    }
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(status: &'static str, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            status_code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map an `OrderError` to its HTTP response.
///
/// `storage_failure` replaces the message of persistence and timeout errors,
/// so each endpoint reports which write failed.
pub fn order_error_to_response(err: &OrderError, storage_failure: &str) -> ApiError {
    let code = err.status_code();
    let message = match err {
        OrderError::Persistence(_) | OrderError::Timeout { .. } => storage_failure.to_string(),
        other => other.public_message(),
    };

    let mut body = ErrorResponse::new(err.status_label(), code, message);
    if let Some(errors) = err.field_errors() {
        body = body.with_errors(errors.to_vec());
    }

    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(body),
    )
}

/// List envelope
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: "success",
            status_code: 200,
            data,
        }
    }
}

/// Created-order envelope with the payment session the client must complete
#[derive(Debug, Serialize)]
pub struct CreatedOrderResponse {
    pub status: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: &'static str,
    pub token: String,
    pub redirect_url: String,
    pub data: Order,
}

/// Projection returned by the list endpoints
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: u64,
    pub checkout_id: u64,
    pub status: OrderStatus,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at,
            updated_at: order.updated_at,
            user_id: order.user_id,
            checkout_id: order.checkout_id,
            status: order.status,
        }
    }
}
