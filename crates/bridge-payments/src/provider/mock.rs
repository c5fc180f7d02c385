//! Mock Payment Provider
//!
//! For testing and local demos. Never touches the network; every request is
//! recorded so tests can inspect what would have been sent to Stripe.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::PaymentProvider;
use crate::checkout::{CheckoutSessionRequest, PaymentIntentRequest};
use crate::error::{PaymentError, Result};

/// What the mock answers with
#[derive(Clone, Debug)]
pub enum MockOutcome {
    /// Both calls succeed
    Succeed {
        client_secret: String,
        session_url: String,
    },

    /// Stripe rejects the request with this message
    Reject(String),

    /// The call fails without a provider message (network, decoding, ...)
    Fail(String),
}

/// Mock provider with a fixed outcome
pub struct MockPaymentProvider {
    outcome: MockOutcome,
    sessions: Mutex<Vec<CheckoutSessionRequest>>,
    intents: Mutex<Vec<PaymentIntentRequest>>,
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::succeeding("pi_mock_secret_mock", "https://checkout.stripe.com/c/pay/cs_test_mock")
    }
}

impl MockPaymentProvider {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            sessions: Mutex::new(Vec::new()),
            intents: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(client_secret: impl Into<String>, session_url: impl Into<String>) -> Self {
        Self::new(MockOutcome::Succeed {
            client_secret: client_secret.into(),
            session_url: session_url.into(),
        })
    }

    pub fn rejecting(message: impl Into<String>) -> Self {
        Self::new(MockOutcome::Reject(message.into()))
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(MockOutcome::Fail(reason.into()))
    }

    /// Checkout session requests received so far
    pub async fn session_requests(&self) -> Vec<CheckoutSessionRequest> {
        self.sessions.lock().await.clone()
    }

    /// Payment intent requests received so far
    pub async fn intent_requests(&self) -> Vec<PaymentIntentRequest> {
        self.intents.lock().await.clone()
    }

    fn respond(&self, pick: impl FnOnce(&str, &str) -> String) -> Result<String> {
        match &self.outcome {
            MockOutcome::Succeed { client_secret, session_url } => Ok(pick(client_secret, session_url)),
            MockOutcome::Reject(message) => Err(PaymentError::Provider(message.clone())),
            MockOutcome::Fail(reason) => Err(PaymentError::Unknown(reason.clone())),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<String> {
        self.sessions.lock().await.push(request.clone());
        self.respond(|_, url| url.to_string())
    }

    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<String> {
        self.intents.lock().await.push(request.clone());
        self.respond(|secret, _| secret.to_string())
    }

    fn name(&self) -> &str {
        "MockStripe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_requests() {
        let provider = MockPaymentProvider::succeeding("cs_test_123", "https://example.test/pay");

        let secret = provider
            .create_payment_intent(&PaymentIntentRequest::new("card", "usd"))
            .await
            .unwrap();
        assert_eq!(secret, "cs_test_123");

        let requests = provider.intent_requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].payment_method_type, "card");
    }

    #[tokio::test]
    async fn test_mock_rejection() {
        let provider = MockPaymentProvider::rejecting("card declined");
        let err = provider
            .create_payment_intent(&PaymentIntentRequest::new("card", "usd"))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Provider(ref msg) if msg == "card declined"));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let provider = MockPaymentProvider::failing("socket closed");
        let request = CheckoutSessionRequest::new(Vec::new(), "https://a.test/success", "https://a.test/cancel");
        let err = provider.create_checkout_session(&request).await.unwrap_err();
        assert!(matches!(err, PaymentError::Unknown(_)));
        assert_eq!(provider.session_requests().await.len(), 1);
    }
}
