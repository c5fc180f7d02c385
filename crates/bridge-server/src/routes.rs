//! Router

use std::path::PathBuf;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeFile,
    trace::TraceLayer,
};

use crate::handlers::{
    create_checkout_session, create_payment_intent, get_config, health_check, stripe_webhook,
};
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let static_dir = PathBuf::from(&state.config.static_dir);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))

        // Payments
        .route("/api/payments/config", get(get_config))
        .route("/api/payments/create-checkout-session", post(create_checkout_session))
        .route("/api/payments/create-payment-intent", post(create_payment_intent))
        .route("/api/payments/webhook", post(stripe_webhook))

        // Checkout return pages
        .route_service("/success", ServeFile::new(static_dir.join("success.html")))
        .route_service("/cancel", ServeFile::new(static_dir.join("cancel.html")))

        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}
