//! Reads the expiry claim out of an auth token.
//!
//! The token is a signed JWT; the client only decodes the payload segment
//! and reads `exp` (seconds since epoch). Signature validation is the
//! backend's responsibility, never done here.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Decode the claims object of a JWT without verifying the signature.
fn decode_claims(token: &str) -> Option<serde_json::Value> {
    let payload = token.split('.').nth(1)?;
    // Tolerate padded encodings even though JWTs are unpadded
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Extract the `exp` claim (seconds since epoch), if present.
pub fn expiry_claim(token: &str) -> Option<i64> {
    decode_claims(token)?.get("exp")?.as_i64()
}

/// Whether the token should be treated as expired at `now` (epoch seconds).
///
/// An undecodable token counts as expired; a decodable token without an
/// `exp` claim never expires.
pub fn is_expired(token: &str, now: i64) -> bool {
    match decode_claims(token) {
        Some(claims) => match claims.get("exp").and_then(serde_json::Value::as_i64) {
            Some(exp) => exp <= now,
            None => false,
        },
        None => true,
    }
}
