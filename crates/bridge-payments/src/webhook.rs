//! Stripe Webhook Handling
//!
//! Per delivery: `Received -> Verifying -> Verified -> Parsed -> Dispatched`,
//! or `Rejected` if the signature or payload is bad. Nothing is parsed until
//! the signature checks out.

use std::sync::Arc;

use crate::error::Result;
use crate::event::{EventData, WebhookEvent};
use crate::ledger::FulfillmentLedger;
use crate::signature::WebhookVerifier;

/// What dispatching an event did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Checkout completed; `newly_recorded` is false on redelivery
    SessionCompleted {
        session_id: String,
        newly_recorded: bool,
    },

    /// Checkout session expired without payment
    SessionExpired { session_id: String },

    /// Payment intent succeeded
    PaymentSucceeded { payment_intent_id: String, amount: i64 },

    /// Payment intent failed
    PaymentFailed {
        payment_intent_id: String,
        reason: Option<String>,
    },

    /// Event type we do not act on
    Ignored { event_type: String },
}

/// Webhook handler
pub struct WebhookHandler<L: FulfillmentLedger> {
    verifier: WebhookVerifier,
    ledger: Arc<L>,
}

impl<L: FulfillmentLedger> WebhookHandler<L> {
    pub fn new(verifier: WebhookVerifier, ledger: Arc<L>) -> Self {
        Self { verifier, ledger }
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Verify the signature and decode the event
    pub fn construct_event(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent> {
        let verified = self.verifier.verify(payload, signature)?;
        WebhookEvent::parse(verified)
    }

    /// Verify, decode and dispatch one delivery
    pub fn process(&self, payload: &[u8], signature: &str) -> Result<WebhookOutcome> {
        let event = self.construct_event(payload, signature)?;
        tracing::info!(event_id = %event.id, event_type = %event.event_type, "Processing Stripe webhook");
        self.dispatch(&event)
    }

    /// Route a verified event to its side effect
    pub fn dispatch(&self, event: &WebhookEvent) -> Result<WebhookOutcome> {
        let outcome = match &event.data {
            EventData::CheckoutSessionCompleted(session) => {
                let newly_recorded = self.ledger.record(&event.id, &session.id)?;
                if newly_recorded {
                    tracing::info!(event_id = %event.id, session_id = %session.id, "Checkout session completed");
                } else {
                    tracing::info!(event_id = %event.id, session_id = %session.id, "Duplicate delivery ignored");
                }
                WebhookOutcome::SessionCompleted {
                    session_id: session.id.clone(),
                    newly_recorded,
                }
            }

            EventData::CheckoutSessionExpired(session) => {
                tracing::info!(session_id = %session.id, "Checkout session expired");
                WebhookOutcome::SessionExpired {
                    session_id: session.id.clone(),
                }
            }

            EventData::PaymentIntentSucceeded(intent) => {
                tracing::info!(payment_intent_id = %intent.id, amount = intent.amount, "Payment succeeded");
                WebhookOutcome::PaymentSucceeded {
                    payment_intent_id: intent.id.clone(),
                    amount: intent.amount,
                }
            }

            EventData::PaymentIntentFailed(intent) => {
                let reason = intent.last_payment_error.as_ref().and_then(|e| e.message.clone());
                tracing::warn!(payment_intent_id = %intent.id, reason = ?reason, "Payment failed");
                WebhookOutcome::PaymentFailed {
                    payment_intent_id: intent.id.clone(),
                    reason,
                }
            }

            EventData::Other => {
                tracing::debug!(event_type = %event.event_type, "Unhandled webhook event");
                WebhookOutcome::Ignored {
                    event_type: event.event_type.clone(),
                }
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::ledger::MemoryLedger;
    use crate::signature::signature_header;
    use chrono::Utc;

    const SECRET: &str = "whsec_handler_tests";

    fn handler() -> WebhookHandler<MemoryLedger> {
        WebhookHandler::new(WebhookVerifier::new(SECRET), Arc::new(MemoryLedger::new()))
    }

    fn signed(payload: &str) -> String {
        signature_header(SECRET, Utc::now().timestamp(), payload.as_bytes()).unwrap()
    }

    fn completed(event_id: &str, session_id: &str) -> String {
        format!(
            r#"{{"id":"{event_id}","type":"checkout.session.completed","data":{{"object":{{"id":"{session_id}","url":null}}}}}}"#
        )
    }

    #[test]
    fn test_session_completed_recorded_once() {
        let handler = handler();
        let payload = completed("evt_1", "cs_abc");

        let first = handler.process(payload.as_bytes(), &signed(&payload)).unwrap();
        assert_eq!(
            first,
            WebhookOutcome::SessionCompleted {
                session_id: "cs_abc".into(),
                newly_recorded: true
            }
        );

        let again = handler.process(payload.as_bytes(), &signed(&payload)).unwrap();
        assert!(matches!(again, WebhookOutcome::SessionCompleted { newly_recorded: false, .. }));

        let entries = handler.ledger().list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_id, "cs_abc");
    }

    #[test]
    fn test_bad_signature_has_no_side_effects() {
        let handler = handler();
        let payload = completed("evt_1", "cs_abc");

        let err = handler.process(payload.as_bytes(), "t=1,v1=deadbeef").unwrap_err();
        assert!(matches!(err, PaymentError::Verification(_)));
        assert!(handler.ledger().list().unwrap().is_empty());
    }

    #[test]
    fn test_unverified_garbage_is_a_verification_error() {
        // The body is never looked at when the signature fails
        let handler = handler();
        let err = handler.process(b"not json", "t=1,v1=00").unwrap_err();
        assert!(matches!(err, PaymentError::Verification(_)));
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let handler = handler();
        let payload = r#"{"id":"evt_9","type":"invoice.finalized","data":{"object":{"id":"in_1"}}}"#;

        let outcome = handler.process(payload.as_bytes(), &signed(payload)).unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                event_type: "invoice.finalized".into()
            }
        );
        assert!(handler.ledger().list().unwrap().is_empty());
    }

    #[test]
    fn test_every_recognized_type_dispatches() {
        let handler = handler();
        let cases = [
            (
                r#"{"id":"e1","type":"checkout.session.expired","data":{"object":{"id":"cs_x"}}}"#,
                WebhookOutcome::SessionExpired { session_id: "cs_x".into() },
            ),
            (
                r#"{"id":"e2","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","amount":5999}}}"#,
                WebhookOutcome::PaymentSucceeded {
                    payment_intent_id: "pi_1".into(),
                    amount: 5999,
                },
            ),
            (
                r#"{"id":"e3","type":"payment_intent.payment_failed","data":{"object":{"id":"pi_2","last_payment_error":{"message":"card declined"}}}}"#,
                WebhookOutcome::PaymentFailed {
                    payment_intent_id: "pi_2".into(),
                    reason: Some("card declined".into()),
                },
            ),
        ];

        for (payload, expected) in cases {
            assert_eq!(handler.process(payload.as_bytes(), &signed(payload)).unwrap(), expected);
        }
    }

    #[test]
    fn test_verified_but_malformed_is_parse_error() {
        let handler = handler();
        let payload = r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#;
        let err = handler.process(payload.as_bytes(), &signed(payload)).unwrap_err();
        assert!(matches!(err, PaymentError::Parse(_)));
    }
}
