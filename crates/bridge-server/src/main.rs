//! stripe-bridge HTTP Server
//!
//! Axum-based server fronting Stripe: hosted checkout sessions, payment
//! intents for Stripe Elements, and signed webhook ingestion.

mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bridge_payments::{BridgeConfig, PaymentProvider, StripeProvider};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing secrets are fatal: never serve without them
    let config = BridgeConfig::from_env().context("failed to load configuration")?;

    tracing::info!(
        domain = %config.domain,
        static_dir = %config.static_dir,
        test_mode = config.is_test_mode(),
        "✓ Configuration loaded"
    );
    if !std::path::Path::new(&config.static_dir).is_dir() {
        tracing::warn!("⚠ STATIC_DIR {} does not exist - /success and /cancel will 404", config.static_dir);
    }

    let provider: Arc<dyn PaymentProvider> = Arc::new(StripeProvider::from_config(&config));
    let addr = config.bind_addr.clone();

    let state = AppState::new(config, provider);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 stripe-bridge running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                                - Health check");
    tracing::info!("  GET  /success, /cancel                      - Checkout return pages");
    tracing::info!("  GET  /api/payments/config                   - Publishable key");
    tracing::info!("  POST /api/payments/create-checkout-session  - Hosted checkout (303)");
    tracing::info!("  POST /api/payments/create-payment-intent    - Payment intent");
    tracing::info!("  POST /api/payments/webhook                  - Stripe webhook");
    tracing::info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
