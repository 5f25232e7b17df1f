//! Webhook signature verification.
//!
//! Verification runs over the raw, unparsed body bytes. Verifying a
//! re-serialized JSON body would silently break on key ordering and
//! whitespace, so callers must hand over exactly what arrived on the wire.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify an inbound webhook body against its signature header.
///
/// An empty `secret` means verification is disabled and every request
/// passes; the config loader only allows that mode behind an explicit
/// insecure flag, and the server logs it loudly at startup. With a secret
/// configured, an absent or malformed header fails closed.
///
/// The header value may carry an optional `sha256=` prefix. Comparison is
/// constant-time via [`Mac::verify_slice`].
pub fn verify_webhook_signature(raw_body: &[u8], header_value: Option<&str>, secret: &str) -> bool {
    if secret.is_empty() {
        return true;
    }

    let Some(header) = header_value else {
        return false;
    };
    let digest_hex = header.trim();
    let digest_hex = digest_hex.strip_prefix("sha256=").unwrap_or(digest_hex);

    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&expected).is_ok()
}
