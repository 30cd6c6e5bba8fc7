// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Tron Wallet
//!
//! Top-level handle over one seed phrase on one network. Ties the HD key
//! store, the signing pipeline and the transaction watcher together; most
//! callers only ever touch this type.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::blockchain::{
    Network, SendError, SendResult, TronClient, TronClientError, TxSender,
};
use crate::events::{EventBus, TransactionActivity};
use crate::keys::{KeyError, KeyStore};
use crate::providers::trongrid::{TronGridClient, TronGridError};
use crate::watcher::{TransactionWatcher, WatchSet, WatcherState};

pub struct TronWallet {
    keys: Arc<KeyStore>,
    sender: TxSender,
    watch: WatchSet,
    events: EventBus,
    watcher: TransactionWatcher,
}

impl TronWallet {
    /// Create a wallet for the given 12 word seed phrase on `network`.
    pub fn new(mnemonic: &str, network: Network) -> Result<Self, WalletError> {
        let config = network.config();
        Self::with_endpoints(mnemonic, config.full_node_url, config.api_base_url)
    }

    /// Create a wallet against explicit full node and indexing API
    /// endpoints instead of a well-known network.
    pub fn with_endpoints(
        mnemonic: &str,
        full_node_url: &str,
        api_base_url: &str,
    ) -> Result<Self, WalletError> {
        let keys = Arc::new(KeyStore::new(mnemonic)?);
        let client = Arc::new(TronClient::new(full_node_url)?);
        let trongrid = Arc::new(TronGridClient::new(api_base_url)?);

        let watch = WatchSet::new();
        let events = EventBus::new();
        let sender = TxSender::new(client, Arc::clone(&keys));
        let watcher = TransactionWatcher::new(trongrid, watch.clone(), events.clone());

        Ok(Self {
            keys,
            sender,
            watch,
            events,
            watcher,
        })
    }

    /// The HD key store behind this wallet.
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// The set of addresses the watcher sweeps.
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch
    }

    /// Derive the address at `index` and register it for polling.
    pub fn hd_address(&self, index: u32) -> Result<String, KeyError> {
        let address = self.keys.address(index)?;
        self.watch.add(&address);
        Ok(address)
    }

    /// Watch an externally owned address. Returns whether it was new.
    pub fn watch_address(&self, address: &str) -> bool {
        self.watch.add(address)
    }

    /// Watch several addresses at once.
    pub fn watch_addresses(&self, addresses: &[String]) {
        self.watch.add_all(addresses)
    }

    /// Send native TRX from the key at `from_index`. Single attempt, no
    /// retries; the receipt reports whether the node accepted it.
    pub async fn send_trx(
        &self,
        from_index: u32,
        to: &str,
        amount: u64,
    ) -> Result<SendResult, SendError> {
        self.sender.send_trx(from_index, to, amount).await
    }

    /// Send a TRC-20 token transfer from the key at `from_index`.
    pub async fn send_trc20(
        &self,
        from_index: u32,
        to: &str,
        contract: &str,
        amount: u64,
    ) -> Result<SendResult, SendError> {
        self.sender.send_trc20(from_index, to, contract, amount).await
    }

    /// Subscribe to confirmed-activity events.
    pub fn subscribe(&self) -> broadcast::Receiver<TransactionActivity> {
        self.events.subscribe()
    }

    /// Start polling for confirmed activity at or after `initial_cursor_ms`
    /// (unix millis). No-op when already running.
    pub fn start_polling(&self, initial_cursor_ms: i64) {
        self.watcher.start(initial_cursor_ms);
    }

    /// Stop the polling loop. Safe to call when stopped.
    pub fn stop_polling(&self) {
        self.watcher.stop();
    }

    /// Lifecycle state of the polling loop.
    pub fn polling_state(&self) -> WatcherState {
        self.watcher.state()
    }
}

/// Errors raised while assembling a wallet.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Key store setup failed: {0}")]
    Key(#[from] KeyError),

    #[error("Full node client setup failed: {0}")]
    Node(#[from] TronClientError),

    #[error("Indexing API client setup failed: {0}")]
    Indexing(#[from] TronGridError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const TEST_MNEMONIC: &str =
        "season predict random cool daughter predict squeeze use mosquito smart around panic";
    const INDEX_100_ADDRESS: &str = "TUfzSqg7C5ED2EnaXTTocTxPwFwXRxnhsp";
    const RECIPIENT: &str = "TSHjEK1QXeipenKk7TZT5Tqr1zpSa5Jce1";
    const TXID: &str = "6ec098928ca3be8a4cfac821e59c184e3fa7ab128d86e7d988281a8e1dd3e3e0";

    fn offline_wallet() -> TronWallet {
        TronWallet::with_endpoints(TEST_MNEMONIC, "http://localhost:9", "http://localhost:9")
            .unwrap()
    }

    #[test]
    fn rejects_a_short_seed_phrase() {
        let result = TronWallet::new("one two three", Network::Shasta);
        assert!(matches!(result, Err(WalletError::Key(_))));
    }

    #[test]
    fn builds_for_both_networks() {
        assert!(TronWallet::new(TEST_MNEMONIC, Network::Main).is_ok());
        assert!(TronWallet::new(TEST_MNEMONIC, Network::Shasta).is_ok());
    }

    #[test]
    fn hd_address_derives_and_registers_for_polling() {
        let wallet = offline_wallet();

        let address = wallet.hd_address(100).unwrap();
        assert_eq!(address, INDEX_100_ADDRESS);
        assert!(wallet.watch_set().contains(&address));

        // Re-deriving the same index does not grow the watch set.
        wallet.hd_address(100).unwrap();
        assert_eq!(wallet.watch_set().len(), 1);
    }

    #[test]
    fn watch_address_is_idempotent_through_the_facade() {
        let wallet = offline_wallet();

        assert!(wallet.watch_address(RECIPIENT));
        assert!(!wallet.watch_address(RECIPIENT));
        wallet.watch_addresses(&[RECIPIENT.to_string(), INDEX_100_ADDRESS.to_string()]);
        assert_eq!(wallet.watch_set().len(), 2);
    }

    #[tokio::test]
    async fn sends_trx_through_the_facade() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/wallet/createtransaction");
            then.status(200)
                .json_body(json!({ "txID": TXID, "raw_data": {} }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/wallet/broadcasttransaction");
            then.status(200).json_body(json!({ "result": true, "txid": TXID }));
        });

        let wallet =
            TronWallet::with_endpoints(TEST_MNEMONIC, &server.base_url(), "http://localhost:9")
                .unwrap();
        let result = wallet.send_trx(0, RECIPIENT, 5_000_000).await.unwrap();

        assert_eq!(result.txid, TXID);
        assert!(result.receipt.result);
    }

    #[tokio::test]
    async fn polling_lifecycle_through_the_facade() {
        let wallet = offline_wallet();

        assert_eq!(wallet.polling_state(), WatcherState::Stopped);

        // No watched addresses, so the first sweep makes no requests.
        wallet.start_polling(0);
        assert_eq!(wallet.polling_state(), WatcherState::Running);

        wallet.start_polling(0);
        assert_eq!(wallet.polling_state(), WatcherState::Running);

        wallet.stop_polling();
        assert_eq!(wallet.polling_state(), WatcherState::Stopped);

        wallet.stop_polling();
        assert_eq!(wallet.polling_state(), WatcherState::Stopped);
    }
}
