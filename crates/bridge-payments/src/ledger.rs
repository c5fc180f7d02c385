//! Fulfillment Ledger
//!
//! Records completed checkout sessions keyed by the webhook event that
//! reported them. Stripe redelivers events it did not see acknowledged, so
//! recording is idempotent per event id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{PaymentError, Result};

/// A fulfilled checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    /// Event that reported the completion
    pub event_id: String,

    /// Completed checkout session
    pub session_id: String,

    /// When we first saw it
    pub recorded_at: DateTime<Utc>,
}

/// Ledger storage trait
pub trait FulfillmentLedger: Send + Sync {
    /// Record a completed session.
    ///
    /// Returns `false` when `event_id` was already recorded.
    fn record(&self, event_id: &str, session_id: &str) -> Result<bool>;

    /// Look up what an event recorded
    fn get(&self, event_id: &str) -> Result<Option<Fulfillment>>;

    /// All fulfillments in the order they were recorded
    fn list(&self) -> Result<Vec<Fulfillment>>;
}

#[derive(Default)]
struct LedgerInner {
    by_event: HashMap<String, usize>,
    entries: Vec<Fulfillment>,
}

/// In-memory ledger (for development)
///
/// Unbounded: entries live for the life of the process and are lost on
/// restart. Production deployments need a persistent [`FulfillmentLedger`].
#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<LedgerInner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> PaymentError {
    PaymentError::Storage("ledger lock poisoned".into())
}

impl FulfillmentLedger for MemoryLedger {
    fn record(&self, event_id: &str, session_id: &str) -> Result<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if inner.by_event.contains_key(event_id) {
            return Ok(false);
        }

        let index = inner.entries.len();
        inner.entries.push(Fulfillment {
            event_id: event_id.to_string(),
            session_id: session_id.to_string(),
            recorded_at: Utc::now(),
        });
        inner.by_event.insert(event_id.to_string(), index);

        Ok(true)
    }

    fn get(&self, event_id: &str) -> Result<Option<Fulfillment>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .by_event
            .get(event_id)
            .and_then(|&index| inner.entries.get(index))
            .cloned())
    }

    fn list(&self) -> Result<Vec<Fulfillment>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_once_per_event() {
        let ledger = MemoryLedger::new();

        assert!(ledger.record("evt_1", "cs_abc").unwrap());
        assert!(!ledger.record("evt_1", "cs_abc").unwrap());

        let entries = ledger.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_id, "cs_abc");
    }

    #[test]
    fn test_lookup_by_event() {
        let ledger = MemoryLedger::new();
        ledger.record("evt_1", "cs_one").unwrap();
        ledger.record("evt_2", "cs_two").unwrap();

        assert_eq!(ledger.get("evt_2").unwrap().unwrap().session_id, "cs_two");
        assert!(ledger.get("evt_3").unwrap().is_none());
        assert_eq!(ledger.list().unwrap().len(), 2);
    }

    #[test]
    fn test_grows_with_each_distinct_event() {
        let ledger = MemoryLedger::new();
        for i in 0..50 {
            ledger.record(&format!("evt_{i}"), "cs_same").unwrap();
            ledger.record(&format!("evt_{i}"), "cs_same").unwrap();
        }

        let entries = ledger.list().unwrap();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[49].event_id, "evt_49");
    }
}
