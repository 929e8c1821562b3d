//! HTTP client for the ledger service
//!
//! Each call is a single request/response with no local state, no retries
//! and no queueing. Transport failures, timeouts, non-2xx statuses and
//! undecodable bodies all surface as [`WalletError::Network`].

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::transaction::Transaction;
use crate::types::{BalanceResponse, Block, ChainResponse, MineRequest};

#[derive(Clone, Debug)]
pub struct LedgerClient {
    client: reqwest::Client,
    base_url: String,
}

impl LedgerClient {
    pub fn new(config: &WalletConfig) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(WalletError::network)?;

        Ok(Self {
            client,
            base_url: config.ledger_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /balance/{address}
    pub async fn fetch_balance(&self, address: &str) -> Result<f64, WalletError> {
        let url = format!("{}/balance/{}", self.base_url, address);
        let response = self.client.get(&url).send().await.map_err(WalletError::network)?;
        let body: BalanceResponse = Self::decode(response).await?;
        Ok(body.balance)
    }

    /// POST /tx with the signed transaction as body
    ///
    /// Acceptance semantics belong to the ledger; its reply is returned as-is.
    pub async fn submit_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<serde_json::Value, WalletError> {
        let url = format!("{}/tx", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(tx)
            .send()
            .await
            .map_err(WalletError::network)?;
        Self::decode(response).await
    }

    /// POST /mine crediting `miner`
    pub async fn trigger_mine(&self, miner: &str) -> Result<serde_json::Value, WalletError> {
        let url = format!("{}/mine", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&MineRequest { miner })
            .send()
            .await
            .map_err(WalletError::network)?;
        Self::decode(response).await
    }

    /// GET /chain; a reply without `chain` is an empty chain
    pub async fn fetch_chain(&self) -> Result<Vec<Block>, WalletError> {
        let url = format!("{}/chain", self.base_url);
        let response = self.client.get(&url).send().await.map_err(WalletError::network)?;
        let body: ChainResponse = Self::decode(response).await?;
        Ok(body.chain)
    }

    /// GET /faucet/{address}
    pub async fn request_faucet(&self, address: &str) -> Result<serde_json::Value, WalletError> {
        let url = format!("{}/faucet/{}", self.base_url, address);
        let response = self.client.get(&url).send().await.map_err(WalletError::network)?;
        Self::decode(response).await
    }

    /// Pending transactions: disabled
    ///
    /// The ledger's `/pending` endpoint is not consumed. This never touches
    /// the network and always yields an empty list.
    pub async fn fetch_pending(&self) -> Result<Vec<Transaction>, WalletError> {
        log::trace!("Pending transaction polling is disabled");
        Ok(Vec::new())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, WalletError> {
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::Network(format!(
                "{} from {}: {}",
                status,
                url,
                body.trim()
            )));
        }

        response.json::<T>().await.map_err(WalletError::network)
    }
}
