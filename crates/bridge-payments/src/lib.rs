//! # bridge-payments
//!
//! Stripe checkout, payment intents and webhook verification for stripe-bridge.
//!
//! ## Stripe Integration Strategies
//!
//! ### 1. Stripe Checkout (Hosted)
//!
//! **Flow:** Your site → Redirect to Stripe's hosted page → Redirect back
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Your Site  │────▶│  Stripe Hosted  │────▶│  /success   │
//! │  (checkout) │     │  Checkout Page  │     │  /cancel    │
//! └─────────────┘     └─────────────────┘     └─────────────┘
//! ```
//!
//! ### 2. Stripe Elements (Embedded)
//!
//! The browser fetches the publishable key, asks us for a payment intent and
//! confirms it with Stripe.js using the returned client secret.
//!
//! ### Webhooks
//!
//! Stripe reports the outcome asynchronously. Every delivery is verified
//! against the endpoint secret on the raw body before it is decoded:
//!
//! ```text
//! raw body + Stripe-Signature ──▶ WebhookVerifier ──▶ VerifiedPayload
//!                                                        │
//!                              WebhookEvent::parse ◀─────┘
//!                                      │
//!                     WebhookHandler::dispatch ──▶ FulfillmentLedger
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_payments::{BridgeConfig, CheckoutSessionRequest, PaymentProvider, StripeProvider};
//!
//! let config = BridgeConfig::from_env()?;
//! let stripe = StripeProvider::from_config(&config);
//!
//! let url = stripe
//!     .create_checkout_session(&CheckoutSessionRequest::for_config(&config))
//!     .await?;
//! // Redirect user to: url
//! ```

mod checkout;
mod config;
mod error;
mod event;
mod ledger;
mod provider;
mod signature;
mod webhook;

pub use checkout::{
    ACSS_DEBIT, CheckoutLineItem, CheckoutSessionRequest, MandateOptions, PAYMENT_INTENT_AMOUNT,
    PaymentIntentRequest, PaymentSchedule, TransactionType,
};
pub use config::BridgeConfig;
pub use error::{PaymentError, Result};
pub use event::{EventData, LastPaymentError, PaymentIntentObject, SessionObject, WebhookEvent};
pub use ledger::{Fulfillment, FulfillmentLedger, MemoryLedger};
pub use provider::{MockOutcome, MockPaymentProvider, PaymentProvider, StripeProvider};
pub use signature::{
    DEFAULT_TOLERANCE, SIGNATURE_HEADER, VerifiedPayload, WebhookVerifier, compute_signature,
    signature_header,
};
pub use webhook::{WebhookHandler, WebhookOutcome};
