//! Checkout Session and Payment Intent Requests
//!
//! Provider-neutral descriptions of what we ask Stripe to create. The
//! hosted-checkout flow sells one fixed item; the embedded (Elements) flow
//! creates a payment intent for a fixed amount in the caller's currency.

use serde::{Deserialize, Serialize};

use crate::config::BridgeConfig;

/// Amount charged by the embedded flow, in minor currency units
pub const PAYMENT_INTENT_AMOUNT: i64 = 5999;

/// Payment method type that requires a debit mandate
pub const ACSS_DEBIT: &str = "acss_debit";

/// A single checkout line item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    pub image_url: String,
    pub currency: String,
    /// Price per unit in minor units (cents)
    pub unit_amount: i64,
    pub quantity: u64,
}

impl CheckoutLineItem {
    /// The item sold through hosted checkout
    pub fn catalogue_item() -> Self {
        Self {
            name: "Stubborn Attachments".into(),
            image_url: "https://i.imgur.com/EHyR2nP.png".into(),
            currency: "usd".into(),
            unit_amount: 2000,
            quantity: 1,
        }
    }
}

/// Request to create a hosted checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub line_items: Vec<CheckoutLineItem>,

    /// URL to redirect after successful payment
    pub success_url: String,

    /// URL to redirect if checkout is cancelled
    pub cancel_url: String,
}

impl CheckoutSessionRequest {
    pub fn new(line_items: Vec<CheckoutLineItem>, success_url: impl Into<String>, cancel_url: impl Into<String>) -> Self {
        Self {
            line_items,
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Catalogue item with redirects back to this service's static pages
    pub fn for_config(config: &BridgeConfig) -> Self {
        Self::new(
            vec![CheckoutLineItem::catalogue_item()],
            config.success_url(),
            config.cancel_url(),
        )
    }
}

/// Mandate payment schedule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentSchedule {
    Combined,
    Interval,
    Sporadic,
}

/// Mandate transaction type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Business,
    Personal,
}

/// Mandate options for pre-authorized debit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandateOptions {
    pub payment_schedule: PaymentSchedule,
    pub transaction_type: TransactionType,
}

impl Default for MandateOptions {
    fn default() -> Self {
        Self {
            payment_schedule: PaymentSchedule::Sporadic,
            transaction_type: TransactionType::Personal,
        }
    }
}

/// Request to create a payment intent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub payment_method_type: String,

    /// Only present for `acss_debit`
    pub mandate_options: Option<MandateOptions>,
}

impl PaymentIntentRequest {
    pub fn new(payment_method_type: impl Into<String>, currency: impl Into<String>) -> Self {
        let payment_method_type = payment_method_type.into();
        let mandate_options = (payment_method_type == ACSS_DEBIT).then(MandateOptions::default);

        Self {
            amount: PAYMENT_INTENT_AMOUNT,
            currency: currency.into().to_lowercase(),
            payment_method_type,
            mandate_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acss_debit_carries_mandate() {
        let request = PaymentIntentRequest::new("acss_debit", "cad");
        let mandate = request.mandate_options.expect("mandate options");
        assert_eq!(mandate.payment_schedule, PaymentSchedule::Sporadic);
        assert_eq!(mandate.transaction_type, TransactionType::Personal);
        assert_eq!(request.amount, PAYMENT_INTENT_AMOUNT);
    }

    #[test]
    fn test_other_methods_omit_mandate() {
        for method in ["card", "us_bank_account", "sepa_debit", "ACSS_DEBIT", ""] {
            let request = PaymentIntentRequest::new(method, "usd");
            assert!(request.mandate_options.is_none(), "{method} should not carry a mandate");
        }
    }

    #[test]
    fn test_mandate_wire_values() {
        let json = serde_json::to_value(MandateOptions::default()).unwrap();
        assert_eq!(json["payment_schedule"], "sporadic");
        assert_eq!(json["transaction_type"], "personal");
    }

    #[test]
    fn test_currency_is_normalised() {
        assert_eq!(PaymentIntentRequest::new("card", "USD").currency, "usd");
    }

    #[test]
    fn test_catalogue_item() {
        let item = CheckoutLineItem::catalogue_item();
        assert_eq!(item.unit_amount, 2000);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.currency, "usd");
    }
}
