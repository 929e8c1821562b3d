//! Identity key management
//!
//! Generates or imports a secp256k1 key pair and derives the ledger address
//! from the public key. Identities live in memory only.

use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::WalletError;

/// Hex length of a derived address (20 bytes)
pub const ADDRESS_HEX_LEN: usize = 40;

/// Hex length of a private key scalar (32 bytes)
const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Signing key pair plus derived address for one wallet session
#[derive(Clone)]
pub struct Identity {
    secret_key: SecretKey,
    public_key: PublicKey,
    public_key_hex: String,
    address: String,
}

impl Identity {
    fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        // Uncompressed SEC1 (04 || X || Y), the form the ledger expects
        let public_key_hex = hex::encode(public_key.serialize_uncompressed());
        let address = derive_address(&public_key_hex);

        Self {
            secret_key,
            public_key,
            public_key_hex,
            address,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Uncompressed public key, lowercase hex (130 chars)
    pub fn public_key_hex(&self) -> &str {
        &self.public_key_hex
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Private key scalar as lowercase hex, for explicit export only
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .field("public_key", &self.public_key_hex)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for Identity {}

pub struct KeyStore;

impl KeyStore {
    /// Generate a fresh random identity
    pub fn create() -> Identity {
        let secret_key = SecretKey::new(&mut secp256k1::rand::rngs::OsRng);
        let identity = Identity::from_secret_key(secret_key);
        log::debug!("Generated identity {}", identity.address);
        identity
    }

    /// Rebuild an identity from a hex-encoded private key
    ///
    /// Accepts exactly 64 hex digits, optionally `0x`-prefixed and surrounded
    /// by whitespace. The scalar must be non-zero and below the curve order.
    pub fn import(private_key_hex: &str) -> Result<Identity, WalletError> {
        let trimmed = private_key_hex.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != PRIVATE_KEY_HEX_LEN {
            return Err(WalletError::InvalidKey(format!(
                "expected {} hex characters, got {}",
                PRIVATE_KEY_HEX_LEN,
                digits.len()
            )));
        }

        let bytes = hex::decode(digits).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        let secret_key = SecretKey::from_slice(&bytes)
            .map_err(|_| WalletError::InvalidKey("scalar out of range for secp256k1".into()))?;

        let identity = Identity::from_secret_key(secret_key);
        log::debug!("Imported identity {}", identity.address);
        Ok(identity)
    }
}

/// Derive the ledger address for a hex-encoded public key
///
/// SHA-256 over the UTF-8 bytes of the hex string, keeping the last 40 hex
/// characters. No checksum and no version byte.
pub fn derive_address(public_key_hex: &str) -> String {
    let digest = hex::encode(Sha256::digest(public_key_hex.as_bytes()));
    digest[digest.len() - ADDRESS_HEX_LEN..].to_string()
}
