//! Signed value-transfer transactions
//!
//! A [`Transaction`] is built and signed in one step by
//! [`TransactionSigner`] and is immutable afterwards. The serialized record is
//! the exact payload posted to the ledger's `/tx` endpoint.

use chrono::Utc;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::WalletError;
use crate::keys::Identity;
use crate::signature_utils::{canonical_message, message_digest, sign_digest, verify_digest};

/// Largest integer an f64 carries exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub from: String,
    pub to: String,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: f64,
    /// Client clock at construction, ms since epoch
    pub timestamp: u64,
    pub public_key: String,
    /// Hex DER ECDSA signature over the canonical message digest
    pub signature: String,
}

impl Transaction {
    /// The `from|to|amount|timestamp|publicKey` string that was signed
    pub fn canonical_message(&self) -> String {
        canonical_message(
            &self.from,
            &self.to,
            self.amount,
            self.timestamp,
            &self.public_key,
        )
    }

    /// SHA-256 of the canonical message, lowercase hex
    pub fn message_hash(&self) -> String {
        hex::encode(message_digest(&self.canonical_message()))
    }

    /// Check the signature against the embedded public key
    pub fn verify(&self) -> bool {
        verify_digest(
            message_digest(&self.canonical_message()),
            &self.signature,
            &self.public_key,
        )
    }
}

/// Integral amounts go on the wire as JSON integers (`10`, not `10.0`)
fn serialize_amount<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if amount.fract() == 0.0 && amount.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*amount as i64)
    } else {
        serializer.serialize_f64(*amount)
    }
}

pub struct TransactionSigner;

impl TransactionSigner {
    /// Build and sign a transfer stamped with the current time
    pub fn sign(identity: &Identity, to: &str, amount: f64) -> Result<Transaction, WalletError> {
        let timestamp = Utc::now().timestamp_millis().max(0) as u64;
        Self::sign_at(identity, to, amount, timestamp)
    }

    /// Build and sign a transfer with an explicit timestamp
    ///
    /// 1. Render the canonical message `from|to|amount|timestamp|publicKey`
    /// 2. Hash it with SHA-256
    /// 3. Sign the digest with the identity's key (ECDSA/secp256k1, DER)
    pub fn sign_at(
        identity: &Identity,
        to: &str,
        amount: f64,
        timestamp: u64,
    ) -> Result<Transaction, WalletError> {
        // NaN and infinities have no JSON form and no stable rendering
        if !amount.is_finite() {
            return Err(WalletError::Signing(format!(
                "amount must be a finite number, got {}",
                amount
            )));
        }

        let mut tx = Transaction {
            from: identity.address().to_string(),
            to: to.to_string(),
            amount,
            timestamp,
            public_key: identity.public_key_hex().to_string(),
            signature: String::new(),
        };

        let digest = message_digest(&tx.canonical_message());
        tx.signature = sign_digest(digest, identity.secret_key());

        log::debug!(
            "Signed transfer {} -> {} amount={} ts={}",
            tx.from,
            tx.to,
            amount,
            timestamp
        );
        Ok(tx)
    }
}
