//! Application State

use std::sync::Arc;

use bridge_payments::{BridgeConfig, MemoryLedger, PaymentProvider, WebhookHandler, WebhookVerifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration loaded at startup
    pub config: Arc<BridgeConfig>,

    /// Payment provider (Stripe, or a mock in tests)
    pub provider: Arc<dyn PaymentProvider>,

    /// Webhook verifier and dispatcher
    pub webhooks: Arc<WebhookHandler<MemoryLedger>>,
}

impl AppState {
    pub fn new(config: BridgeConfig, provider: Arc<dyn PaymentProvider>) -> Self {
        let verifier = WebhookVerifier::with_tolerance(config.webhook_secret.clone(), config.webhook_tolerance);
        let webhooks = WebhookHandler::new(verifier, Arc::new(MemoryLedger::new()));

        Self {
            config: Arc::new(config),
            provider,
            webhooks: Arc::new(webhooks),
        }
    }
}
