//! Payment Provider Integration
//!
//! The payment API sits behind [`PaymentProvider`] so handlers never talk to
//! Stripe directly. [`StripeProvider`] is the live implementation;
//! [`MockPaymentProvider`] stands in for it in tests and local demos.

mod mock;
mod stripe_client;

pub use mock::{MockOutcome, MockPaymentProvider};
pub use stripe_client::StripeProvider;

use async_trait::async_trait;

use crate::checkout::{CheckoutSessionRequest, PaymentIntentRequest};
use crate::error::Result;

/// Payment provider trait (Strategy pattern)
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout session, returning the URL to redirect the buyer to
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<String>;

    /// Create a payment intent, returning its client secret
    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<String>;

    /// Provider name
    fn name(&self) -> &str;
}
