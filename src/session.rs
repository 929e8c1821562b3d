//! Wallet session context
//!
//! Owns the active identity and the ledger client, and drives the sync loop.
//! Presentation code reads state through [`WalletSession::subscribe`] and
//! never writes it.

use tokio::sync::watch;

use crate::client::LedgerClient;
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::keys::{Identity, KeyStore};
use crate::sync::{SyncHandle, SyncLoop};
use crate::transaction::TransactionSigner;
use crate::types::WalletView;

pub struct WalletSession {
    client: LedgerClient,
    identity: Option<Identity>,
    sync: SyncHandle,
}

impl WalletSession {
    /// Connect to the configured ledger and start background sync
    ///
    /// Must be called from within a tokio runtime. Chain polling starts
    /// right away; balance polling starts once an identity is installed.
    pub fn start(config: WalletConfig) -> Result<Self, WalletError> {
        let client = LedgerClient::new(&config)?;
        let sync = SyncLoop::spawn(client.clone(), &config);
        log::info!("Wallet session started against {}", client.base_url());

        Ok(Self {
            client,
            identity: None,
            sync,
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Generate a fresh identity and make it active
    pub fn create_identity(&mut self) -> &Identity {
        self.install(KeyStore::create())
    }

    /// Import a private key and make it active
    ///
    /// On failure the previously active identity stays in place.
    pub fn import_identity(&mut self, private_key_hex: &str) -> Result<&Identity, WalletError> {
        let identity = KeyStore::import(private_key_hex)?;
        Ok(self.install(identity))
    }

    /// Drop the active identity and stop polling its balance
    pub fn clear_identity(&mut self) {
        if let Some(identity) = self.identity.take() {
            log::info!("Cleared identity {}", identity.address());
            self.sync.set_active_address(None);
        }
    }

    fn install(&mut self, identity: Identity) -> &Identity {
        log::info!("Active identity: {}", identity.address());
        self.sync
            .set_active_address(Some(identity.address().to_string()));
        self.identity.insert(identity)
    }

    /// Sign and submit a transfer from the active identity
    ///
    /// Returns the ledger's reply. A refresh is requested whether or not the
    /// submission went through; the reply does not mean the transfer is
    /// already reflected in the chain.
    pub async fn send(&self, to: &str, amount: f64) -> Result<serde_json::Value, WalletError> {
        let identity = self
            .identity
            .as_ref()
            .ok_or_else(|| WalletError::Signing("no active identity".into()))?;
        let tx = TransactionSigner::sign(identity, to, amount)?;

        let result = self.client.submit_transaction(&tx).await;
        self.sync.refresh();

        match &result {
            Ok(reply) => log::info!("Transaction result: {}", reply),
            Err(e) => log::warn!("Transaction submission failed: {}", e),
        }
        result
    }

    /// Ask the ledger to mine a block rewarding the active address
    pub async fn mine(&self) -> Result<serde_json::Value, WalletError> {
        let address = self.active_address()?;
        let result = self.client.trigger_mine(address).await;
        self.sync.refresh();

        match &result {
            Ok(reply) => log::info!("Mining result: {}", reply),
            Err(e) => log::warn!("Mining request failed: {}", e),
        }
        result
    }

    /// Request test funds for the active address
    pub async fn request_faucet(&self) -> Result<serde_json::Value, WalletError> {
        let address = self.active_address()?;
        let result = self.client.request_faucet(address).await;
        self.sync.refresh();

        if let Err(e) = &result {
            log::warn!("Faucet request failed: {}", e);
        }
        result
    }

    fn active_address(&self) -> Result<&str, WalletError> {
        self.identity
            .as_ref()
            .map(Identity::address)
            .ok_or(WalletError::NoActiveIdentity)
    }

    /// Read-only subscription to balance and chain snapshots
    pub fn subscribe(&self) -> watch::Receiver<WalletView> {
        self.sync.subscribe()
    }

    /// Latest published state
    pub fn view(&self) -> WalletView {
        self.sync.view()
    }

    pub fn refresh(&self) {
        self.sync.refresh();
    }

    /// End the session and stop background polling
    pub async fn shutdown(self) {
        log::info!("Shutting down wallet session");
        self.sync.shutdown().await;
    }
}
