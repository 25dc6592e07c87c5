//! # Marketplace Orders RS
//!
//! Order creation and payment reconciliation service.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export JWT_SECRET=...
//! export MIDTRANS_SERVER_KEY=SB-Mid-server-...
//! export MIDTRANS_CLIENT_KEY=SB-Mid-client-...
//!
//! # Run the server
//! marketplace-orders
//! ```

use order_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.provider);
    info!(
        "Notification signatures: {}",
        if state.verifies_notifications { "verified" } else { "NOT verified" }
    );
    info!("Store timeout: {:?}", state.config.store_timeout);

    let app = routes::create_router(state);

    info!("Marketplace orders starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Orders: POST http://{}/api/v1/orders", addr);
        info!("Webhook: POST http://{}/webhook/midtrans", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Marketplace Orders RS
  ━━━━━━━━━━━━━━━━━━━━━━━
  Orders and payment reconciliation
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
