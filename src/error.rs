//! Error types for wallet operations
//!
//! One enum covers key handling, signing, ledger I/O and snapshot
//! bookkeeping. Only `InvalidKey` is meant for inline display to the user;
//! the rest are logged and returned from the action that failed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    /// Private key import input was not a usable secp256k1 scalar
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Transaction could not be signed; nothing was submitted
    #[error("Signing error: {0}")]
    Signing(String),

    #[error("No active identity")]
    NoActiveIdentity,

    /// Any ledger call failure: transport, timeout, non-2xx or bad JSON
    #[error("Network error: {0}")]
    Network(String),

    /// A fetch completed after a newer one was already applied
    #[error("Stale {resource} response: token {token} <= applied {applied}")]
    StaleResponse {
        resource: &'static str,
        token: u64,
        applied: u64,
    },

    #[error("Chain integrity check failed: {0}")]
    ChainIntegrity(String),
}

impl WalletError {
    /// Create a network error from anything displayable
    pub fn network(msg: impl ToString) -> Self {
        Self::Network(msg.to_string())
    }

    /// Whether the error came from the ledger boundary
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
