//! Shared test infrastructure for wallet integration tests
//!
//! Provides an in-process mock ledger served by axum on an ephemeral port:
//! - GET  /balance/:address
//! - POST /tx        (verifies the signature, queues the transfer)
//! - POST /mine      (applies queued transfers, pays a reward, appends a block)
//! - GET  /chain
//! - GET  /faucet/:address

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use xchain_wallet::{Transaction, WalletView};

pub const MINING_REWARD: f64 = 50.0;
pub const FAUCET_AMOUNT: f64 = 100.0;
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000_000;

pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// In-memory ledger state behind the mock server
pub struct MockLedger {
    pub balances: HashMap<String, f64>,
    pub chain: Vec<Value>,
    pub pending: Vec<Transaction>,
    /// Raw `/tx` bodies in arrival order
    pub submitted: Vec<Value>,
}

pub type SharedLedger = Arc<Mutex<MockLedger>>;

impl MockLedger {
    pub fn new() -> Self {
        let mut ledger = Self {
            balances: HashMap::new(),
            chain: Vec::new(),
            pending: Vec::new(),
            submitted: Vec::new(),
        };
        ledger.push_block(Vec::new());
        ledger
    }

    pub fn credit(&mut self, address: &str, amount: f64) {
        *self.balances.entry(address.to_string()).or_insert(0.0) += amount;
    }

    pub fn balance_of(&self, address: &str) -> f64 {
        self.balances.get(address).copied().unwrap_or(0.0)
    }

    pub fn push_block(&mut self, transactions: Vec<Value>) {
        let index = self.chain.len() as u64;
        let previous_hash = self
            .chain
            .last()
            .and_then(|block| block["hash"].as_str())
            .unwrap_or("0")
            .to_string();
        let timestamp = GENESIS_TIMESTAMP + index * 5_000;
        let hash = hex::encode(Sha256::digest(
            format!("{}|{}|{}|{}", index, previous_hash, timestamp, transactions.len()).as_bytes(),
        ));

        self.chain.push(json!({
            "index": index,
            "timestamp": timestamp,
            "transactions": transactions,
            "previousHash": previous_hash,
            "hash": hash,
            "nonce": index * 7,
        }));
    }
}

/// Build the mock ledger router over shared state
pub fn ledger_router(ledger: SharedLedger) -> Router {
    Router::new()
        .route("/balance/:address", get(get_balance))
        .route("/tx", post(submit_transaction))
        .route("/mine", post(mine_block))
        .route("/chain", get(get_chain))
        .route("/faucet/:address", get(faucet))
        .with_state(ledger)
}

/// Serve a router on 127.0.0.1 with an ephemeral port, returning its base URL
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock ledger");
    let addr = listener.local_addr().expect("mock ledger address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock ledger server");
    });

    format!("http://{}", addr)
}

/// Start a fresh mock ledger, returning its base URL and shared state
pub async fn spawn_ledger() -> (String, SharedLedger) {
    let ledger = Arc::new(Mutex::new(MockLedger::new()));
    let url = spawn_router(ledger_router(ledger.clone())).await;
    (url, ledger)
}

/// Wait until the published view satisfies `predicate`
pub async fn wait_for_view<F>(rx: &mut watch::Receiver<WalletView>, predicate: F) -> WalletView
where
    F: Fn(&WalletView) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            {
                let view = rx.borrow_and_update();
                if predicate(&view) {
                    return (*view).clone();
                }
            }
            rx.changed().await.expect("sync loop stopped");
        }
    })
    .await
    .expect("timed out waiting for wallet view")
}

async fn get_balance(
    State(ledger): State<SharedLedger>,
    Path(address): Path<String>,
) -> Json<Value> {
    let balance = ledger.lock().unwrap().balance_of(&address);
    Json(json!({ "balance": balance }))
}

async fn submit_transaction(
    State(ledger): State<SharedLedger>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut ledger = ledger.lock().unwrap();
    ledger.submitted.push(body.clone());

    let tx: Transaction = serde_json::from_value(body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("malformed transaction: {}", e)))?;

    if !tx.verify() {
        return Ok(Json(json!({ "accepted": false, "error": "invalid signature" })));
    }
    if ledger.balance_of(&tx.from) < tx.amount {
        return Ok(Json(json!({ "accepted": false, "error": "insufficient balance" })));
    }

    ledger.pending.push(tx);
    Ok(Json(json!({ "accepted": true })))
}

async fn mine_block(
    State(ledger): State<SharedLedger>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let miner = body["miner"]
        .as_str()
        .ok_or((StatusCode::BAD_REQUEST, "missing miner".to_string()))?
        .to_string();

    let mut ledger = ledger.lock().unwrap();
    let pending = std::mem::take(&mut ledger.pending);
    let mut transactions = Vec::new();

    for tx in pending {
        ledger.credit(&tx.from, -tx.amount);
        ledger.credit(&tx.to, tx.amount);
        transactions.push(serde_json::to_value(&tx).unwrap());
    }
    ledger.credit(&miner, MINING_REWARD);
    transactions.push(json!({ "from": null, "to": miner, "amount": MINING_REWARD }));

    let mined = transactions.len();
    ledger.push_block(transactions);
    let index = ledger.chain.len() - 1;

    Ok(Json(json!({ "message": "block mined", "index": index, "transactions": mined })))
}

async fn get_chain(State(ledger): State<SharedLedger>) -> Json<Value> {
    Json(json!({ "chain": ledger.lock().unwrap().chain }))
}

async fn faucet(State(ledger): State<SharedLedger>, Path(address): Path<String>) -> Json<Value> {
    ledger.lock().unwrap().credit(&address, FAUCET_AMOUNT);
    Json(json!({ "credited": FAUCET_AMOUNT, "address": address }))
}
