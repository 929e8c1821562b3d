//! Signature utilities for ledger transactions
//!
//! The ledger verifies a transaction by rebuilding a `|`-joined canonical
//! message from the submitted fields, hashing it with SHA-256 and checking a
//! DER-encoded secp256k1 ECDSA signature over that digest. Field order,
//! delimiter and number formatting must match byte for byte.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

/// Field delimiter of the canonical message
pub const FIELD_DELIMITER: char = '|';

/// Build the canonical message `from|to|amount|timestamp|publicKey`
///
/// # Example
/// ```ignore
/// let msg = canonical_message("de11..", "abc1..", 10.0, 1700000000000, "0479..");
/// assert_eq!(msg, "de11..|abc1..|10|1700000000000|0479..");
/// ```
pub fn canonical_message(
    from: &str,
    to: &str,
    amount: f64,
    timestamp: u64,
    public_key_hex: &str,
) -> String {
    format!(
        "{from}{d}{to}{d}{amount}{d}{timestamp}{d}{public_key_hex}",
        d = FIELD_DELIMITER,
        amount = format_amount(amount),
    )
}

/// Render an amount the way the ledger's number-to-string conversion does
///
/// Integral values carry no fractional part, `-0` prints as `0`, and values
/// outside `[1e-6, 1e21)` switch to exponent form with an explicit sign
/// (`1e+21`, `1.5e-7`). Everything else is the shortest round-trip decimal.
pub fn format_amount(amount: f64) -> String {
    if amount == 0.0 {
        return "0".to_string();
    }

    let magnitude = amount.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", amount);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        };
    }

    amount.to_string()
}

/// SHA-256 digest of the canonical message
pub fn message_digest(message: &str) -> [u8; 32] {
    Sha256::digest(message.as_bytes()).into()
}

/// Sign a 32-byte digest, returning the hex-encoded DER signature
///
/// Nonces are RFC 6979 deterministic, so the same key and digest always
/// produce the same signature.
pub fn sign_digest(digest: [u8; 32], signing_key: &SecretKey) -> String {
    let secp = Secp256k1::new();
    let message = Message::from_digest(digest);
    let signature = secp.sign_ecdsa(&message, signing_key);

    // DER is variable length, typically 70-72 bytes
    hex::encode(signature.serialize_der())
}

/// Check a hex DER signature over `digest` against a hex public key
///
/// Malformed hex, keys or signatures simply fail verification. High-S
/// signatures from other signers are normalized before checking.
pub fn verify_digest(digest: [u8; 32], signature_hex: &str, public_key_hex: &str) -> bool {
    let Ok(public_key) = hex::decode(public_key_hex)
        .map_err(|_| ())
        .and_then(|bytes| PublicKey::from_slice(&bytes).map_err(|_| ()))
    else {
        return false;
    };

    let Ok(mut signature) = hex::decode(signature_hex)
        .map_err(|_| ())
        .and_then(|bytes| Signature::from_der(&bytes).map_err(|_| ()))
    else {
        return false;
    };
    signature.normalize_s();

    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&Message::from_digest(digest), &signature, &public_key)
        .is_ok()
}
