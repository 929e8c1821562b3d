//! XChain Wallet: client-side wallet for the XChain ledger service
//!
//! Manages a secp256k1 identity, signs value transfers in the ledger's
//! canonical format, and keeps a periodically refreshed view of the remote
//! chain and account balance.
//!
//! # Architecture
//!
//! - **KeyStore**: creates or imports an identity and derives its address
//! - **TransactionSigner**: builds the canonical message and signs it
//! - **LedgerClient**: HTTP/JSON boundary to the ledger service
//! - **SyncLoop**: background poller publishing balance and chain snapshots
//! - **WalletSession**: ties the above together for a presentation layer
//!
//! # Example
//!
//! ```ignore
//! use xchain_wallet::{WalletConfig, WalletSession};
//!
//! let mut session = WalletSession::start(WalletConfig::from_env())?;
//! let address = session.create_identity().address().to_string();
//!
//! session.request_faucet().await?;
//! session.send("abc1230000000000000000000000000000000000", 10.0).await?;
//!
//! let mut view = session.subscribe();
//! view.changed().await?;
//! println!("{} holds {:?}", address, view.borrow().balance);
//! ```

// Public modules
pub mod chain;
pub mod client;
pub mod config;
pub mod error;
pub mod keys;
pub mod revision;
pub mod session;
pub mod signature_utils;
pub mod sync;
pub mod transaction;
pub mod types;

// Re-exports for convenience
pub use chain::verify_linkage;
pub use client::LedgerClient;
pub use config::WalletConfig;
pub use error::WalletError;
pub use keys::{derive_address, Identity, KeyStore};
pub use session::WalletSession;
pub use signature_utils::{canonical_message, format_amount};
pub use sync::{SyncCommand, SyncHandle, SyncLoop};
pub use transaction::{Transaction, TransactionSigner};
pub use types::{Block, BlockTransaction, WalletView};

// Common result type
pub type Result<T> = std::result::Result<T, WalletError>;
