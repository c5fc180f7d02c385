//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Required configuration missing or invalid (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stripe rejected the request
    #[error("Stripe error: {0}")]
    Provider(String),

    /// Request rejected before reaching Stripe
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    Verification(String),

    /// Verified webhook payload could not be decoded
    #[error("Webhook parse error: {0}")]
    Parse(String),

    /// Fulfillment ledger error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Anything else
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl PaymentError {
    /// Message safe to hand back to the caller.
    ///
    /// Stripe and validation messages are passed through; everything else
    /// collapses to a generic text.
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Provider(msg) | PaymentError::InvalidRequest(msg) => msg.clone(),
            _ => "unknown failure: 500".into(),
        }
    }

    /// True when the caller sent something unacceptable (as opposed to a server fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaymentError::Provider(_)
                | PaymentError::InvalidRequest(_)
                | PaymentError::Verification(_)
                | PaymentError::Parse(_)
        )
    }
}
