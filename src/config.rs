//! Wallet configuration
//!
//! Only the ledger base URL comes from the environment; poll cadence and
//! timeouts are fixed defaults that tests override directly.

use std::env;
use std::time::Duration;

/// Ledger service used when `LEDGER_API_URL` is unset
pub const DEFAULT_LEDGER_URL: &str = "http://localhost:3333";

/// Refresh cadence of the sync loop
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Ledger service base URL (no trailing slash)
    pub ledger_url: String,
    /// Interval between background refreshes
    pub poll_interval: Duration,
    /// Per-request timeout for ledger calls
    pub request_timeout: Duration,
    /// Reject chain snapshots whose `previousHash` links are broken
    pub verify_chain_linkage: bool,
}

impl WalletConfig {
    /// Load configuration from the environment
    ///
    /// Environment variables:
    /// - `LEDGER_API_URL`: ledger service endpoint (default `http://localhost:3333`)
    ///
    /// A `.env` file in the working directory is honoured.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let ledger_url = match env::var("LEDGER_API_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => {
                log::info!("📡 Ledger URL: {} (default)", DEFAULT_LEDGER_URL);
                DEFAULT_LEDGER_URL.to_string()
            }
        };

        Self::with_ledger_url(ledger_url)
    }

    /// Default settings pointed at a specific ledger
    pub fn with_ledger_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            ledger_url: url.trim().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            ledger_url: DEFAULT_LEDGER_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Duration::from_secs(10),
            verify_chain_linkage: false,
        }
    }
}
