//! Webhook Signature Verification
//!
//! Stripe signs every delivery with HMAC-SHA256 and sends the result in the
//! `Stripe-Signature` header:
//!
//! ```text
//! Stripe-Signature: t=1492774577,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
//! ```
//!
//! The signed message is `"{t}.{raw body}"` keyed with the endpoint's
//! `whsec_...` secret. Verification must run on the raw bytes exactly as
//! received: re-serializing parsed JSON changes the bytes and breaks the MAC.
//! Several `v1` entries may be present while a secret is being rolled; any
//! match is accepted. `v0` entries are ignored.

use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PaymentError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a signed timestamp before the delivery is treated as a replay
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Raw payload whose signature has been checked.
///
/// Only [`WebhookVerifier`] can construct one, so anything that accepts a
/// `VerifiedPayload` cannot be handed unauthenticated bytes.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedPayload<'a> {
    bytes: &'a [u8],
    timestamp: i64,
}

impl<'a> VerifiedPayload<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Unix timestamp from the signature header
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

#[derive(Debug)]
struct SignatureHeader<'h> {
    timestamp: i64,
    signatures: Vec<&'h str>,
}

impl<'h> SignatureHeader<'h> {
    fn parse(header: &'h str) -> Result<Self> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        PaymentError::Verification("timestamp is not an integer".into())
                    })?);
                }
                "v1" => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| PaymentError::Verification("missing timestamp".into()))?;
        if signatures.is_empty() {
            return Err(PaymentError::Verification("no v1 signature".into()));
        }

        Ok(Self { timestamp, signatures })
    }
}

/// Verifies webhook deliveries against the endpoint secret
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance: Duration,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_tolerance(secret, DEFAULT_TOLERANCE)
    }

    /// A zero tolerance disables the replay check
    pub fn with_tolerance(secret: impl Into<String>, tolerance: Duration) -> Self {
        Self {
            secret: secret.into(),
            tolerance,
        }
    }

    /// Verify `payload` against `header` using the current clock
    pub fn verify<'a>(&self, payload: &'a [u8], header: &str) -> Result<VerifiedPayload<'a>> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// Verify `payload` against `header` as of unix time `now`
    pub fn verify_at<'a>(&self, payload: &'a [u8], header: &str, now: i64) -> Result<VerifiedPayload<'a>> {
        let parsed = SignatureHeader::parse(header)?;

        let mac = signed_mac(&self.secret, parsed.timestamp, payload)?;
        let matched = parsed.signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|expected| mac.clone().verify_slice(&expected).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            return Err(PaymentError::Verification("no signature matches the payload".into()));
        }

        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);
        if tolerance > 0 && parsed.timestamp < now.saturating_sub(tolerance) {
            return Err(PaymentError::Verification(format!(
                "timestamp {} outside the {}s tolerance",
                parsed.timestamp, tolerance
            )));
        }

        Ok(VerifiedPayload {
            bytes: payload,
            timestamp: parsed.timestamp,
        })
    }
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Verification(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex HMAC of a payload, as Stripe would put in a `v1` entry
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String> {
    Ok(hex::encode(signed_mac(secret, timestamp, payload)?.finalize().into_bytes()))
}

/// Complete `Stripe-Signature` header value for a payload.
///
/// Used for test fixtures and for replaying captured events locally.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String> {
    Ok(format!("t={timestamp},v1={}", compute_signature(secret, timestamp, payload)?))
}
