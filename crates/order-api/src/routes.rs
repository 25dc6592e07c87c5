//! # Routes
//!
//! Axum router configuration for the order API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Orders:
///   - GET    /api/v1/orders - List all orders
///   - POST   /api/v1/orders - Create order from a checkout (auth)
///   - GET    /api/v1/orders/me - List the caller's orders (auth)
///   - PUT    /api/v1/orders/{id}/status - Manual status update (seller)
///   - DELETE /api/v1/orders/{id} - Delete order
///
/// - Webhooks:
///   - POST /webhook/midtrans - Payment notification
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let order_routes = Router::new()
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/orders/me", get(handlers::list_my_orders))
        .route("/orders/{id}", delete(handlers::delete_order))
        .route("/orders/{id}/status", put(handlers::update_order_status));

    // Provider callbacks, authenticated by signature rather than token
    let webhook_routes = Router::new().route("/midtrans", post(handlers::payment_notification));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", order_routes)
        .nest("/webhook", webhook_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
