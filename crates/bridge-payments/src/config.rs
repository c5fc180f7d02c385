//! Bridge Configuration
//!
//! Loaded once at startup and shared read-only with every handler.

use std::fmt;
use std::time::Duration;

use crate::error::{PaymentError, Result};
use crate::signature::DEFAULT_TOLERANCE;

pub const SECRET_KEY_VAR: &str = "STRIPE_SECRET_KEY";
pub const PUBLISHABLE_KEY_VAR: &str = "STRIPE_PUBLISHABLE_KEY";
pub const WEBHOOK_SECRET_VAR: &str = "STRIPE_WEBHOOK_SECRET";
pub const DOMAIN_VAR: &str = "DOMAIN";
pub const STATIC_DIR_VAR: &str = "STATIC_DIR";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
pub const TOLERANCE_VAR: &str = "STRIPE_WEBHOOK_TOLERANCE_SECS";

const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4242";

/// Service configuration
#[derive(Clone)]
pub struct BridgeConfig {
    /// Stripe secret API key (`sk_...` or restricted `rk_...`)
    pub secret_key: String,

    /// Stripe publishable key handed to the browser (`pk_...`)
    pub publishable_key: String,

    /// Webhook signing secret (`whsec_...`)
    pub webhook_secret: String,

    /// Public base URL used for success/cancel redirects, no trailing slash
    pub domain: String,

    /// Directory holding `success.html` and `cancel.html`
    pub static_dir: String,

    /// Listen address
    pub bind_addr: String,

    /// Maximum accepted age of a webhook signature timestamp
    pub webhook_tolerance: Duration,
}

impl BridgeConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PaymentError::Config(format!("{name} not set")))
        };

        let webhook_tolerance = match lookup(TOLERANCE_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| PaymentError::Config(format!("{TOLERANCE_VAR} must be a whole number of seconds")))?,
            None => DEFAULT_TOLERANCE,
        };

        let config = Self {
            secret_key: required(SECRET_KEY_VAR)?,
            publishable_key: required(PUBLISHABLE_KEY_VAR)?,
            webhook_secret: required(WEBHOOK_SECRET_VAR)?,
            domain: required(DOMAIN_VAR)?.trim_end_matches('/').to_string(),
            static_dir: lookup(STATIC_DIR_VAR).unwrap_or_else(|| DEFAULT_STATIC_DIR.into()),
            bind_addr: lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            webhook_tolerance,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check key prefixes so a swapped key fails at startup rather than on first request
    pub fn validate(&self) -> Result<()> {
        if !(self.secret_key.starts_with("sk_") || self.secret_key.starts_with("rk_")) {
            return Err(PaymentError::Config(format!("{SECRET_KEY_VAR} must start with sk_ or rk_")));
        }
        if !self.publishable_key.starts_with("pk_") {
            return Err(PaymentError::Config(format!("{PUBLISHABLE_KEY_VAR} must start with pk_")));
        }
        if !self.webhook_secret.starts_with("whsec_") {
            return Err(PaymentError::Config(format!("{WEBHOOK_SECRET_VAR} must start with whsec_")));
        }
        Ok(())
    }

    pub fn is_test_mode(&self) -> bool {
        self.secret_key.contains("_test_")
    }

    pub fn success_url(&self) -> String {
        format!("{}/success", self.domain)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/cancel", self.domain)
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("secret_key", &"<redacted>")
            .field("publishable_key", &self.publishable_key)
            .field("webhook_secret", &"<redacted>")
            .field("domain", &self.domain)
            .field("static_dir", &self.static_dir)
            .field("bind_addr", &self.bind_addr)
            .field("webhook_tolerance", &self.webhook_tolerance)
            .finish()
    }
}
