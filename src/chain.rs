//! Chain snapshot linkage check
//!
//! The ledger is trusted by default. When enabled in [`WalletConfig`], each
//! fetched chain is checked for consecutive indices and intact
//! `previousHash` links before it replaces the current snapshot. Block hashes
//! themselves are not recomputed; that scheme belongs to the server.
//!
//! [`WalletConfig`]: crate::config::WalletConfig

use crate::error::WalletError;
use crate::types::Block;

pub fn verify_linkage(chain: &[Block]) -> Result<(), WalletError> {
    for pair in chain.windows(2) {
        let (prev, block) = (&pair[0], &pair[1]);

        if prev.index.checked_add(1) != Some(block.index) {
            return Err(WalletError::ChainIntegrity(format!(
                "block index {} follows {}",
                block.index, prev.index
            )));
        }
        if block.previous_hash != prev.hash {
            return Err(WalletError::ChainIntegrity(format!(
                "block {} links to {} but predecessor hash is {}",
                block.index, block.previous_hash, prev.hash
            )));
        }
    }
    Ok(())
}
