// Ledger API request/response types

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::transaction::Transaction;

#[derive(Debug, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChainResponse {
    #[serde(default)]
    pub chain: Vec<Block>,
}

#[derive(Debug, Serialize)]
pub struct MineRequest<'a> {
    pub miner: &'a str,
}

/// A block as produced by the ledger; the client never recomputes it
///
/// Decoding is lenient: `null` or missing hashes read as empty strings and
/// numeric fields accept integral floats, so one odd block does not make the
/// whole snapshot undecodable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    #[serde(deserialize_with = "lenient_u64")]
    pub index: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub timestamp: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub transactions: Vec<BlockTransaction>,
    #[serde(deserialize_with = "null_as_default")]
    pub previous_hash: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub nonce: u64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(0);
    };
    number
        .as_u64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        })
        .ok_or_else(|| {
            D::Error::custom(format!("expected a non-negative integer, got {}", number))
        })
}

/// Transaction entry inside a block
///
/// Loosely typed: mining rewards and faucet credits carry no sender,
/// signature or public key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockTransaction {
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<f64>,
    pub timestamp: Option<u64>,
    pub public_key: Option<String>,
    pub signature: Option<String>,
}

/// Read-only state published to presentation subscribers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletView {
    /// Address whose balance is being tracked
    pub address: Option<String>,
    /// Last accepted balance for `address`; `None` until the first poll lands
    pub balance: Option<f64>,
    /// Last accepted chain snapshot
    pub chain: Vec<Block>,
    /// Always empty: pending-transaction polling is disabled
    pub pending: Vec<Transaction>,
    /// Revision token of the applied balance
    pub balance_revision: u64,
    /// Revision token of the applied chain
    pub chain_revision: u64,
}
