//! Background chain and balance synchronization
//!
//! A single task owns the published [`WalletView`]. It polls on a fixed
//! interval and on demand after local actions. Fetches run as independent
//! tasks and may overlap; their completions come back through a channel and
//! are applied by the loop only if their revision token is newer than what
//! is already shown.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::chain::verify_linkage;
use crate::client::LedgerClient;
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::revision::Revision;
use crate::types::{Block, WalletView};

/// Requests from the session to the sync loop
#[derive(Debug, Clone, PartialEq)]
pub enum SyncCommand {
    /// Poll now (after send, mine or faucet)
    Refresh,
    /// Track a different address, or none
    SetActiveAddress(Option<String>),
}

enum Completion {
    Balance {
        token: u64,
        address: String,
        result: Result<f64, WalletError>,
    },
    Chain {
        token: u64,
        result: Result<Vec<Block>, WalletError>,
    },
}

/// Session-side handle to a running sync loop
pub struct SyncHandle {
    commands: mpsc::UnboundedSender<SyncCommand>,
    view_rx: watch::Receiver<WalletView>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    pub fn refresh(&self) {
        self.send(SyncCommand::Refresh);
    }

    pub fn set_active_address(&self, address: Option<String>) {
        self.send(SyncCommand::SetActiveAddress(address));
    }

    fn send(&self, command: SyncCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("Sync loop is not running, command dropped");
        }
    }

    /// Read-only subscription to published state
    pub fn subscribe(&self) -> watch::Receiver<WalletView> {
        self.view_rx.clone()
    }

    /// Copy of the currently published state
    pub fn view(&self) -> WalletView {
        self.view_rx.borrow().clone()
    }

    /// Stop polling and wait for the loop task to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            log::error!("Sync loop task failed: {}", e);
        }
    }
}

pub struct SyncLoop {
    client: LedgerClient,
    poll_interval: Duration,
    verify_chain_linkage: bool,
    active_address: Option<String>,
    balance_rev: Revision,
    chain_rev: Revision,
    view_tx: watch::Sender<WalletView>,
    completions_tx: mpsc::UnboundedSender<Completion>,
}

impl SyncLoop {
    /// Spawn the loop on the current tokio runtime
    ///
    /// The first poll happens immediately. The loop stops on
    /// [`SyncHandle::shutdown`] or when the handle is dropped.
    pub fn spawn(client: LedgerClient, config: &WalletConfig) -> SyncHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (sync_loop, view_rx, completions_rx) = Self::new(client, config);

        log::info!(
            "Sync loop started (interval={}ms, verify_linkage={})",
            config.poll_interval.as_millis(),
            config.verify_chain_linkage
        );
        let task = tokio::spawn(sync_loop.run(commands_rx, completions_rx, shutdown_rx));

        SyncHandle {
            commands: commands_tx,
            view_rx,
            shutdown_tx,
            task,
        }
    }

    fn new(
        client: LedgerClient,
        config: &WalletConfig,
    ) -> (
        Self,
        watch::Receiver<WalletView>,
        mpsc::UnboundedReceiver<Completion>,
    ) {
        let (view_tx, view_rx) = watch::channel(WalletView::default());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let sync_loop = Self {
            client,
            poll_interval: config.poll_interval,
            verify_chain_linkage: config.verify_chain_linkage,
            active_address: None,
            balance_rev: Revision::new("balance"),
            chain_rev: Revision::new("chain"),
            view_tx,
            completions_tx,
        };
        (sync_loop, view_rx, completions_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SyncCommand>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.poll();
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        log::info!("Session closed, sync loop stopping");
                        break;
                    }
                },
                Some(completion) = completions.recv() => {
                    self.apply(completion);
                }
                _ = shutdown_rx.changed() => {
                    log::info!("Sync loop shutting down");
                    break;
                }
            }
        }
    }

    fn handle_command(&mut self, command: SyncCommand) {
        match command {
            SyncCommand::Refresh => self.poll(),
            SyncCommand::SetActiveAddress(address) => {
                if address != self.active_address {
                    // Anything still in flight belongs to the old address
                    self.balance_rev.invalidate();
                    self.active_address = address.clone();
                    self.view_tx.send_modify(|view| {
                        view.address = address;
                        view.balance = None;
                    });
                }
                self.poll();
            }
        }
    }

    fn poll(&mut self) {
        self.poll_chain();
        if let Some(address) = self.active_address.clone() {
            self.poll_balance(address);
        }
    }

    fn poll_chain(&mut self) {
        let token = self.chain_rev.issue();
        let client = self.client.clone();
        let completions = self.completions_tx.clone();

        tokio::spawn(async move {
            let result = client.fetch_chain().await;
            let _ = completions.send(Completion::Chain { token, result });
        });
    }

    fn poll_balance(&mut self, address: String) {
        let token = self.balance_rev.issue();
        let client = self.client.clone();
        let completions = self.completions_tx.clone();

        tokio::spawn(async move {
            let result = client.fetch_balance(&address).await;
            let _ = completions.send(Completion::Balance {
                token,
                address,
                result,
            });
        });
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Chain { token, result } => {
                let chain = match result {
                    Ok(chain) => chain,
                    Err(e) => {
                        log::warn!("Chain refresh failed: {}", e);
                        return;
                    }
                };
                if self.verify_chain_linkage {
                    if let Err(e) = verify_linkage(&chain) {
                        log::warn!("Rejecting chain snapshot #{}: {}", token, e);
                        return;
                    }
                }
                if let Err(e) = self.chain_rev.accept(token) {
                    log::debug!("Discarding chain snapshot: {}", e);
                    return;
                }

                log::debug!("Chain snapshot #{} applied ({} blocks)", token, chain.len());
                self.view_tx.send_modify(|view| {
                    view.chain = chain;
                    view.chain_revision = token;
                });
            }
            Completion::Balance {
                token,
                address,
                result,
            } => {
                let balance = match result {
                    Ok(balance) => balance,
                    Err(e) => {
                        log::warn!("Balance refresh for {} failed: {}", address, e);
                        return;
                    }
                };
                if let Err(e) = self.balance_rev.accept(token) {
                    log::debug!("Discarding balance for {}: {}", address, e);
                    return;
                }

                log::debug!("Balance #{} applied: {} = {}", token, address, balance);
                self.view_tx.send_modify(|view| {
                    view.balance = Some(balance);
                    view.balance_revision = token;
                });
            }
        }
    }
}
