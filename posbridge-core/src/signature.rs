//! HMAC-SHA256 authentication of inbound vendor callbacks.
//!
//! The vendor signs the exact raw request body with a shared secret and sends the lowercase
//! hex digest in the `X-Signature` header (optionally prefixed with `sha256=`). Nothing in a
//! callback may be acted upon before [`WebhookVerifier::verify`] succeeds.

use hmac::{Hmac, Mac};
use posbridge_shared::Masked;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the callback signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing signature")]
    MissingSignature,
    #[error("Webhook secret is not configured")]
    MissingSecret,
    #[error("Malformed signature")]
    Malformed,
    #[error("Signature mismatch")]
    Mismatch,
    /// Surfaces the `InvalidLength` error of `Mac::new_from_slice`. HMAC accepts keys of any
    /// length, so it is not produced for `Hmac<Sha256>`.
    #[error("Invalid signing key")]
    InvalidKey,
}

/// Hex-encoded HMAC-SHA256 of `body` under `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Clone, Default)]
pub struct WebhookVerifier {
    secret: Option<Masked<String>>,
}

impl WebhookVerifier {
    /// A blank secret counts as not configured, so every callback is rejected.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(Masked),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<(), SignatureError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SignatureError::MissingSignature)?;

        let secret = self.secret.as_ref().ok_or(SignatureError::MissingSecret)?;

        let hex_digest = signature.strip_prefix("sha256=").unwrap_or(signature);
        let provided = hex::decode(hex_digest).map_err(|_| SignatureError::Malformed)?;

        let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.expose().as_bytes())
            .map_err(|_| SignatureError::InvalidKey)?;
        mac.update(body);

        // verify_slice compares in constant time
        mac.verify_slice(&provided).map_err(|_| SignatureError::Mismatch)
    }
}
