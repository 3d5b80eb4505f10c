//! HMAC-SHA256 callback signatures
//!
//! A callback is signed over `"<timestamp>.<payload>"` with a shared secret
//! and the signature is sent hex-encoded. Verification checks the timestamp
//! window before it looks at the signature, so a replayed callback is
//! refused even when its signature is genuine.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Default accepted clock skew, in seconds, in either direction
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    #[error("Callback timestamp is {skew_secs}s from now, tolerance is {tolerance_secs}s")]
    StaleTimestamp { skew_secs: i64, tolerance_secs: i64 },

    #[error("Callback signature mismatch")]
    BadSignature,

    #[error("Unknown callback '{0}'")]
    UnknownCallback(String),

    #[error("Callback '{0}' expired")]
    Expired(String),

    #[error("Malformed callback: {0}")]
    Malformed(String),

    #[error("Callback secret is not configured")]
    MissingSecret,
}

/// Hex-encoded `HMAC-SHA256(secret, "<timestamp>.<payload>")`.
///
/// An empty secret is refused.
///
/// # Example
///
/// ```
/// use roundtable_infrastructure::callback::signature::{sign, verify};
///
/// let body = br#"{"decision":"approve"}"#;
/// let sig = sign(b"s3cret", 1_700_000_000, body).unwrap();
/// assert!(verify(b"s3cret", 1_700_000_000, body, &sig, 1_700_000_060, 300).is_ok());
/// ```
pub fn sign(secret: &[u8], timestamp: i64, payload: &[u8]) -> Result<String, CallbackError> {
    let mac = mac_for(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a callback signature against `now` (unix seconds).
///
/// Skew is checked first; the signature compare is constant-time.
pub fn verify(
    secret: &[u8],
    timestamp: i64,
    payload: &[u8],
    signature_hex: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), CallbackError> {
    let skew_secs = now.saturating_sub(timestamp);
    if skew_secs.saturating_abs() > tolerance_secs {
        return Err(CallbackError::StaleTimestamp {
            skew_secs,
            tolerance_secs,
        });
    }

    let expected = hex::decode(signature_hex.trim()).map_err(|_| CallbackError::BadSignature)?;
    mac_for(secret, timestamp, payload)?
        .verify_slice(&expected)
        .map_err(|_| CallbackError::BadSignature)
}

fn mac_for(secret: &[u8], timestamp: i64, payload: &[u8]) -> Result<HmacSha256, CallbackError> {
    if secret.is_empty() {
        return Err(CallbackError::MissingSecret);
    }
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| CallbackError::MissingSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}
