//! # Request Handlers
//!
//! Axum request handlers for the order API.
//! Bodies are parsed by hand so malformed JSON gets the same envelope as
//! every other failure.

use crate::response::{
    order_error_to_response, ApiError, CreatedOrderResponse, DataResponse, ErrorResponse,
    MessageResponse, OrderSummary,
};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use order_core::{
    CreateOrderOutcome, NewOrderRequest, Order, PaymentNotification, Role, StatusUpdateRequest,
};
use serde::de::DeserializeOwned;
use tracing::{error, info, instrument, warn};

const EMPTY_ORDERS: &str = "Order is empty.";

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("bad request", 400, message)),
    )
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected request body: {}", e);
        bad_request("Invalid request body")
    })
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| bad_request("Invalid ID format"))
}

fn order_list(orders: &[Order]) -> Response {
    if orders.is_empty() {
        return (StatusCode::OK, Json(MessageResponse::no_content(EMPTY_ORDERS))).into_response();
    }

    let summaries: Vec<OrderSummary> = orders.iter().map(OrderSummary::from).collect();
    (StatusCode::OK, Json(DataResponse::ok(summaries))).into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "marketplace-orders",
        "version": env!("CARGO_PKG_VERSION"),
        "payment_provider": state.provider
    }))
}

/// List every order
#[instrument(skip(state))]
pub async fn list_orders(State(state): State<AppState>) -> Result<Response, ApiError> {
    let orders = state.manager.list_all().await.map_err(|e| {
        error!("Failed to list orders: {}", e);
        order_error_to_response(&e, "Failed to get orders")
    })?;

    Ok(order_list(&orders))
}

/// List the caller's orders
#[instrument(skip(state, headers))]
pub async fn list_my_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user_id = state
        .auth
        .authorize(&headers, None)
        .map_err(|e| order_error_to_response(&e, ""))?;

    let orders = state.manager.list_for_user(user_id).await.map_err(|e| {
        error!("Failed to list orders of user {}: {}", user_id, e);
        order_error_to_response(&e, "Failed to get orders")
    })?;

    Ok(order_list(&orders))
}

/// Create an order from a checkout and open its payment session
#[instrument(skip(state, headers, body))]
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let user_id = state
        .auth
        .authorize(&headers, None)
        .map_err(|e| order_error_to_response(&e, ""))?;

    let request: NewOrderRequest = parse_body(&body)?;

    let outcome = state
        .builder
        .create_order(user_id, request)
        .await
        .map_err(|e| order_error_to_response(&e, "Failed to create order"))?;

    match outcome {
        CreateOrderOutcome::EmptyCart => {
            info!("Checkout of user {} has no cart lines", user_id);
            Ok((StatusCode::OK, Json(MessageResponse::no_content(EMPTY_ORDERS))).into_response())
        }
        CreateOrderOutcome::Created(placed) => Ok((
            StatusCode::CREATED,
            Json(CreatedOrderResponse {
                status: "success",
                status_code: 201,
                message: "Order created successfully. Please paid as soon as possible.",
                token: placed.session.token,
                redirect_url: placed.session.redirect_url,
                data: placed.order,
            }),
        )
            .into_response()),
    }
}

/// Handle a payment-provider notification
#[instrument(skip(state, body))]
pub async fn payment_notification(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let notification: PaymentNotification = serde_json::from_slice(&body).map_err(|e| {
        warn!("Unparseable payment notification: {}", e);
        bad_request("Invalid notification payload")
    })?;

    let result = state
        .reconciler
        .handle(&notification)
        .await
        .map_err(|e| order_error_to_response(&e, "Failed to update status order"))?;

    info!(
        "Notification applied to order {}: {}",
        result.order_id, result.status
    );

    Ok(Json(MessageResponse::new(
        "ok",
        200,
        "Transaction payment and status updated.",
    )))
}

/// Seller moves one of their paid orders through fulfillment
#[instrument(skip(state, headers, body))]
pub async fn update_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let user_id = state
        .auth
        .authorize(&headers, Some(Role::Seller))
        .map_err(|e| order_error_to_response(&e, ""))?;

    let order_id = parse_id(&raw_id)?;

    // Ownership and state are settled before the body is looked at
    let order = state
        .manager
        .authorize_status_change(user_id, order_id)
        .await
        .map_err(|e| order_error_to_response(&e, "Failed to update status order"))?;

    let request: StatusUpdateRequest = parse_body(&body)?;

    state
        .manager
        .apply_status_change(&order, request)
        .await
        .map_err(|e| order_error_to_response(&e, "Failed to update status order"))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "success",
            201,
            "Status order updated successfully",
        )),
    ))
}

/// Delete an order
#[instrument(skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let order_id = parse_id(&raw_id)?;

    state
        .manager
        .delete(order_id)
        .await
        .map_err(|e| order_error_to_response(&e, "Failed to delete order"))?;

    Ok(Json(MessageResponse::new(
        "success",
        200,
        "Order deleted successfully",
    )))
}
