//! Webhook signature verification
//!
//! ProAbono signs each notification by hashing the per-delivery public key
//! (`x-proabono-key`) concatenated with the account's webhook security key,
//! and sends the digest base64-encoded in `x-proabono-signature`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};

/// Verify the signature of an inbound ProAbono notification.
///
/// Computes `SHA-256(public_key || secret_key)` over the raw UTF-8 bytes and
/// compares it against the base64-decoded `provided_signature`. Returns
/// `false` on malformed base64 or a length mismatch; never panics and never
/// logs either key or the digest.
pub fn verify_signature(public_key: &str, provided_signature: &str, secret_key: &str) -> bool {
    let mut hasher = Sha256::new();
    hasher.update(public_key.as_bytes());
    hasher.update(secret_key.as_bytes());
    let digest = hasher.finalize();

    let provided = match BASE64.decode(provided_signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    if provided.len() != digest.len() {
        return false;
    }

    constant_time_compare(&provided, &digest)
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
