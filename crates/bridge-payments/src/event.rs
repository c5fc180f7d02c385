//! Webhook Event Model
//!
//! Stripe events share one envelope (`id`, `type`, `created`, `livemode`,
//! `data.object`); the shape of `data.object` depends on `type`. Known types
//! decode into a dedicated variant; everything else becomes
//! [`EventData::Other`] so new event types never break delivery.

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, Result};
use crate::signature::VerifiedPayload;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";

/// Checkout session as carried in `data.object`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionObject {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Payment intent as carried in `data.object`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_payment_error: Option<LastPaymentError>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPaymentError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Event data keyed by event type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventData {
    CheckoutSessionCompleted(SessionObject),
    CheckoutSessionExpired(SessionObject),
    PaymentIntentSucceeded(PaymentIntentObject),
    PaymentIntentFailed(PaymentIntentObject),
    /// Any type we do not act on
    Other,
}

/// Authenticated, decoded webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    pub created: i64,
    pub livemode: bool,
    pub data: EventData,
}

#[derive(Deserialize)]
struct Envelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    #[serde(default)]
    livemode: bool,
    data: EnvelopeData,
}

#[derive(Deserialize)]
struct EnvelopeData {
    object: serde_json::Value,
}

impl WebhookEvent {
    /// Decode a payload that has passed signature verification
    pub fn parse(payload: VerifiedPayload<'_>) -> Result<Self> {
        let envelope: Envelope = serde_json::from_slice(payload.as_bytes())
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        let object = envelope.data.object;
        let data = match envelope.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => EventData::CheckoutSessionCompleted(decode(object, "checkout session")?),
            CHECKOUT_SESSION_EXPIRED => EventData::CheckoutSessionExpired(decode(object, "checkout session")?),
            PAYMENT_INTENT_SUCCEEDED => EventData::PaymentIntentSucceeded(decode(object, "payment intent")?),
            PAYMENT_INTENT_FAILED => EventData::PaymentIntentFailed(decode(object, "payment intent")?),
            _ => EventData::Other,
        };

        Ok(Self {
            id: envelope.id,
            event_type: envelope.event_type,
            created: envelope.created,
            livemode: envelope.livemode,
            data,
        })
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self.data, EventData::Other)
    }
}

fn decode<T: serde::de::DeserializeOwned>(object: serde_json::Value, what: &str) -> Result<T> {
    serde_json::from_value(object)
        .map_err(|e| PaymentError::Parse(format!("Invalid {what} data: {e}")))
}
