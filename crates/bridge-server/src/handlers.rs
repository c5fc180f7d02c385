//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::Redirect,
};
use serde::{Deserialize, Serialize};

use bridge_payments::{CheckoutSessionRequest, PaymentError, PaymentIntentRequest, SIGNATURE_HEADER};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub publishable_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentBody {
    pub payment_method_type: String,
    pub currency: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                message: message.into(),
            },
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
    })
}

/// Publishable key for Stripe.js
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        publishable_key: state.config.publishable_key.clone(),
    })
}

/// Create a hosted checkout session and redirect the browser to it (303)
pub async fn create_checkout_session(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let request = CheckoutSessionRequest::for_config(&state.config);

    let url = state.provider.create_checkout_session(&request).await.map_err(|e| {
        tracing::error!("Checkout error: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "unknown failure: 500")
    })?;

    Ok(Redirect::to(&url))
}

/// Create a payment intent for the embedded flow
pub async fn create_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentIntentBody>, JsonRejection>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("Rejected payment intent body: {}", rejection.body_text());
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    let request = PaymentIntentRequest::new(body.payment_method_type, body.currency);

    let client_secret = state.provider.create_payment_intent(&request).await.map_err(|e| {
        match &e {
            PaymentError::Provider(_) | PaymentError::InvalidRequest(_) => {
                tracing::warn!(
                    payment_method_type = %request.payment_method_type,
                    "Payment intent rejected: {}",
                    e
                );
            }
            _ => tracing::error!(
                payment_method_type = %request.payment_method_type,
                "Payment intent error: {}",
                e
            ),
        }
        api_error(StatusCode::BAD_REQUEST, e.user_message())
    })?;

    Ok(Json(PaymentIntentResponse { client_secret }))
}

/// Stripe webhook handler
///
/// Takes the body as raw bytes; it must reach the verifier untouched.
pub async fn stripe_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("Webhook without Stripe-Signature header");
        return StatusCode::BAD_REQUEST;
    };

    match state.webhooks.process(&body, signature) {
        Ok(_) => StatusCode::OK,
        Err(e) if e.is_client_error() => {
            tracing::warn!("Webhook rejected: {}", e);
            StatusCode::BAD_REQUEST
        }
        Err(e) => {
            tracing::error!("Webhook processing error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
