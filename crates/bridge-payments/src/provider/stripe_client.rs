//! Stripe API client

use async_trait::async_trait;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, CreatePaymentIntent,
    CreatePaymentIntentPaymentMethodOptions, CreatePaymentIntentPaymentMethodOptionsAcssDebit,
    CreatePaymentIntentPaymentMethodOptionsAcssDebitMandateOptions as AcssMandateOptions,
    CreatePaymentIntentPaymentMethodOptionsAcssDebitMandateOptionsPaymentSchedule as AcssPaymentSchedule,
    CreatePaymentIntentPaymentMethodOptionsAcssDebitMandateOptionsTransactionType as AcssTransactionType,
    Currency, PaymentIntent, StripeError,
};

use super::PaymentProvider;
use crate::checkout::{
    CheckoutLineItem, CheckoutSessionRequest, MandateOptions, PaymentIntentRequest,
    PaymentSchedule, TransactionType,
};
use crate::config::BridgeConfig;
use crate::error::{PaymentError, Result};

/// Live Stripe provider
pub struct StripeProvider {
    client: Client,
}

impl StripeProvider {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.secret_key)
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<String> {
        let mut line_items = Vec::with_capacity(request.line_items.len());
        for item in &request.line_items {
            line_items.push(session_line_item(item)?);
        }

        let mut params = CreateCheckoutSession::new();
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);
        params.line_items = Some(line_items);

        let session = CheckoutSession::create(&self.client, params)
            .await
            .map_err(provider_error)?;

        tracing::info!(session_id = %session.id, "Created checkout session");

        session
            .url
            .ok_or_else(|| PaymentError::Unknown("No checkout URL returned".into()))
    }

    async fn create_payment_intent(&self, request: &PaymentIntentRequest) -> Result<String> {
        let currency = parse_currency(&request.currency)?;
        let mut params = CreatePaymentIntent::new(request.amount, currency);
        params.payment_method_types = Some(vec![request.payment_method_type.clone()]);

        if let Some(mandate) = request.mandate_options {
            params.payment_method_options = Some(CreatePaymentIntentPaymentMethodOptions {
                acss_debit: Some(CreatePaymentIntentPaymentMethodOptionsAcssDebit {
                    mandate_options: Some(acss_mandate(mandate)),
                    ..Default::default()
                }),
                ..Default::default()
            });
        }

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(provider_error)?;

        tracing::info!(
            payment_intent_id = %intent.id,
            payment_method_type = %request.payment_method_type,
            "Created payment intent"
        );

        intent
            .client_secret
            .ok_or_else(|| PaymentError::Unknown("No client secret returned".into()))
    }

    fn name(&self) -> &str {
        "Stripe"
    }
}

fn session_line_item(item: &CheckoutLineItem) -> Result<CreateCheckoutSessionLineItems> {
    Ok(CreateCheckoutSessionLineItems {
        quantity: Some(item.quantity),
        price_data: Some(CreateCheckoutSessionLineItemsPriceData {
            currency: parse_currency(&item.currency)?,
            unit_amount: Some(item.unit_amount),
            product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                name: item.name.clone(),
                images: Some(vec![item.image_url.clone()]),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn acss_mandate(mandate: MandateOptions) -> AcssMandateOptions {
    let payment_schedule = match mandate.payment_schedule {
        PaymentSchedule::Combined => AcssPaymentSchedule::Combined,
        PaymentSchedule::Interval => AcssPaymentSchedule::Interval,
        PaymentSchedule::Sporadic => AcssPaymentSchedule::Sporadic,
    };
    let transaction_type = match mandate.transaction_type {
        TransactionType::Business => AcssTransactionType::Business,
        TransactionType::Personal => AcssTransactionType::Personal,
    };

    AcssMandateOptions {
        payment_schedule: Some(payment_schedule),
        transaction_type: Some(transaction_type),
        ..Default::default()
    }
}

/// Stripe currencies deserialize from their lowercase ISO code
fn parse_currency(code: &str) -> Result<Currency> {
    serde_json::from_value(serde_json::Value::String(code.to_lowercase()))
        .map_err(|_| PaymentError::InvalidRequest(format!("Invalid currency: {code}")))
}

/// Errors Stripe reported keep their message; transport and decoding errors do not
fn provider_error(err: StripeError) -> PaymentError {
    match err {
        StripeError::Stripe(request) => PaymentError::Provider(
            request
                .message
                .unwrap_or_else(|| format!("Stripe returned HTTP {}", request.http_status)),
        ),
        other => PaymentError::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("usd").unwrap(), Currency::USD);
        assert_eq!(parse_currency("CAD").unwrap(), Currency::CAD);
        assert!(matches!(
            parse_currency("zzz"),
            Err(PaymentError::InvalidRequest(msg)) if msg == "Invalid currency: zzz"
        ));
    }

    #[test]
    fn test_transport_error_is_not_a_provider_error() {
        let err = provider_error(StripeError::ClientError("connection refused".into()));
        assert!(matches!(err, PaymentError::Unknown(_)));
    }

    #[test]
    fn test_acss_mandate_mapping() {
        let mandate = acss_mandate(MandateOptions::default());
        let json = serde_json::to_value(&mandate).unwrap();
        assert_eq!(json["payment_schedule"], "sporadic");
        assert_eq!(json["transaction_type"], "personal");

        for (schedule, expected) in [
            (PaymentSchedule::Combined, "combined"),
            (PaymentSchedule::Interval, "interval"),
        ] {
            let mandate = acss_mandate(MandateOptions {
                payment_schedule: schedule,
                transaction_type: TransactionType::Business,
            });
            let json = serde_json::to_value(&mandate).unwrap();
            assert_eq!(json["payment_schedule"], expected);
            assert_eq!(json["transaction_type"], "business");
        }
    }

    #[test]
    fn test_session_line_item() {
        let item = session_line_item(&CheckoutLineItem::catalogue_item()).unwrap();
        assert_eq!(item.quantity, Some(1));
        let price = item.price_data.unwrap();
        assert_eq!(price.unit_amount, Some(2000));
        assert_eq!(price.product_data.unwrap().name, "Stubborn Attachments");
    }
}
