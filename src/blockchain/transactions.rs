// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction sending for the Tron network.
//!
//! This module provides TRX and TRC-20 transfer sending as a single
//! build, sign, broadcast pass. The full node builds the raw transaction,
//! the key store supplies the signing key, and the signed body is
//! submitted immediately with no retry.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::keys::{KeyError, KeyRecord, KeyStore};

use super::client::TronClient;
use super::signing;
use super::trc20;
use super::types::BroadcastReceipt;

/// Transaction send result.
#[derive(Debug, Clone)]
pub struct SendResult {
    /// Transaction ID (hex)
    pub txid: String,
    /// Node verdict from broadcast
    pub receipt: BroadcastReceipt,
}

/// Transaction sender bound to a full node and a key store.
pub struct TxSender {
    client: Arc<TronClient>,
    keys: Arc<KeyStore>,
}

impl TxSender {
    /// Create a sender over an existing client and key store.
    pub fn new(client: Arc<TronClient>, keys: Arc<KeyStore>) -> Self {
        Self { client, keys }
    }

    /// Send native TRX from the key at `from_index`.
    ///
    /// # Arguments
    /// * `from_index` - Derivation index of the sending key
    /// * `to` - Recipient address (base58check)
    /// * `amount` - Amount in sun
    pub async fn send_trx(
        &self,
        from_index: u32,
        to: &str,
        amount: u64,
    ) -> Result<SendResult, SendError> {
        signing::decode_base58_address(to).map_err(|e| SendError::Build(e.to_string()))?;

        let key = self.keys.derive_or_get(from_index)?;
        let tx = self
            .client
            .create_transfer(&key.address, to, amount)
            .await
            .map_err(|e| SendError::Build(e.to_string()))?;

        self.sign_and_broadcast(tx, &key).await
    }

    /// Send a TRC-20 token transfer from the key at `from_index`.
    ///
    /// # Arguments
    /// * `from_index` - Derivation index of the sending key
    /// * `to` - Recipient address (base58check)
    /// * `contract` - TRC-20 contract address (base58check)
    /// * `amount` - Amount in the token's smallest unit
    pub async fn send_trc20(
        &self,
        from_index: u32,
        to: &str,
        contract: &str,
        amount: u64,
    ) -> Result<SendResult, SendError> {
        let parameter =
            trc20::encode_transfer_params(to, amount).map_err(|e| SendError::Build(e.to_string()))?;
        signing::decode_base58_address(contract).map_err(|e| SendError::Build(e.to_string()))?;

        let key = self.keys.derive_or_get(from_index)?;
        let tx = self
            .client
            .trigger_smart_contract(
                &key.address,
                contract,
                trc20::TRANSFER_SELECTOR,
                &parameter,
                trc20::TRC20_FEE_LIMIT,
            )
            .await
            .map_err(|e| SendError::Build(e.to_string()))?;

        self.sign_and_broadcast(tx, &key).await
    }

    /// Sign a node-built transaction and submit it.
    async fn sign_and_broadcast(
        &self,
        tx: Value,
        key: &KeyRecord,
    ) -> Result<SendResult, SendError> {
        let signed = signing::sign_transaction(tx, &key.private_key_hex)
            .map_err(|e| SendError::Sign(e.to_string()))?;
        let txid = signed["txID"].as_str().unwrap_or_default().to_string();

        let receipt = self
            .client
            .broadcast(&signed)
            .await
            .map_err(|e| SendError::Broadcast(e.to_string()))?;

        info!(txid = %txid, accepted = receipt.result, "Broadcast transaction");

        Ok(SendResult { txid, receipt })
    }
}

/// Errors raised while sending a transaction, one variant per phase.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Key lookup failed: {0}")]
    Key(#[from] KeyError),

    #[error("Transaction build failed: {0}")]
    Build(String),

    #[error("Transaction signing failed: {0}")]
    Sign(String),

    #[error("Transaction broadcast failed: {0}")]
    Broadcast(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const TEST_MNEMONIC: &str =
        "season predict random cool daughter predict squeeze use mosquito smart around panic";
    const RECIPIENT: &str = "TSHjEK1QXeipenKk7TZT5Tqr1zpSa5Jce1";
    const CONTRACT: &str = "TUfzSqg7C5ED2EnaXTTocTxPwFwXRxnhsp";
    const TXID: &str = "6ec098928ca3be8a4cfac821e59c184e3fa7ab128d86e7d988281a8e1dd3e3e0";

    fn sender_for(server: &MockServer) -> TxSender {
        let client = Arc::new(TronClient::new(&server.base_url()).unwrap());
        let keys = Arc::new(KeyStore::new(TEST_MNEMONIC).unwrap());
        TxSender::new(client, keys)
    }

    #[tokio::test]
    async fn sends_trx_end_to_end() {
        let server = MockServer::start();
        let keys = KeyStore::new(TEST_MNEMONIC).unwrap();
        let owner = keys.address(0).unwrap();

        let build = server.mock(|when, then| {
            when.method(POST)
                .path("/wallet/createtransaction")
                .json_body(json!({
                    "owner_address": owner,
                    "to_address": RECIPIENT,
                    "amount": 5_000_000,
                    "visible": true,
                }));
            then.status(200)
                .json_body(json!({ "txID": TXID, "raw_data": {} }));
        });
        let broadcast = server.mock(|when, then| {
            when.method(POST)
                .path("/wallet/broadcasttransaction")
                .json_body_partial(format!(r#"{{ "txID": "{TXID}" }}"#));
            then.status(200)
                .json_body(json!({ "result": true, "txid": TXID }));
        });

        let sender = sender_for(&server);
        let result = sender.send_trx(0, RECIPIENT, 5_000_000).await.unwrap();

        build.assert();
        broadcast.assert();
        assert_eq!(result.txid, TXID);
        assert!(result.receipt.result);
    }

    #[tokio::test]
    async fn sends_trc20_end_to_end() {
        let server = MockServer::start();
        let keys = KeyStore::new(TEST_MNEMONIC).unwrap();
        let owner = keys.address(0).unwrap();
        let parameter = trc20::encode_transfer_params(RECIPIENT, 1_000).unwrap();

        let build = server.mock(|when, then| {
            when.method(POST)
                .path("/wallet/triggersmartcontract")
                .json_body(json!({
                    "owner_address": owner,
                    "contract_address": CONTRACT,
                    "function_selector": "transfer(address,uint256)",
                    "parameter": parameter,
                    "fee_limit": 40_000_000,
                    "call_value": 0,
                    "visible": true,
                }));
            then.status(200).json_body(json!({
                "result": { "result": true },
                "transaction": { "txID": TXID, "raw_data": {} },
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/wallet/broadcasttransaction");
            then.status(200)
                .json_body(json!({ "result": true, "txid": TXID }));
        });

        let sender = sender_for(&server);
        let result = sender.send_trc20(0, RECIPIENT, CONTRACT, 1_000).await.unwrap();

        build.assert();
        assert_eq!(result.txid, TXID);
        assert!(result.receipt.result);
    }

    #[tokio::test]
    async fn rejects_bad_recipient_before_any_request() {
        let server = MockServer::start();
        let sender = sender_for(&server);

        let err = sender.send_trx(0, "garbage", 1).await.unwrap_err();
        assert!(matches!(err, SendError::Build(_)));
        assert!(err.to_string().contains("Invalid address"));

        let err = sender
            .send_trc20(0, "garbage", CONTRACT, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Build(_)));
    }

    #[tokio::test]
    async fn build_rejection_maps_to_build_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/wallet/createtransaction");
            then.status(200)
                .json_body(json!({ "Error": "balance is not sufficient" }));
        });

        let sender = sender_for(&server);
        let err = sender.send_trx(0, RECIPIENT, 1).await.unwrap_err();
        assert!(matches!(err, SendError::Build(_)));
    }

    #[tokio::test]
    async fn node_rejection_is_a_receipt_not_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/wallet/createtransaction");
            then.status(200)
                .json_body(json!({ "txID": TXID, "raw_data": {} }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/wallet/broadcasttransaction");
            then.status(200).json_body(json!({
                "result": false,
                "code": "SIGERROR",
                "message": hex::encode("validate signature error"),
            }));
        });

        let sender = sender_for(&server);
        let result = sender.send_trx(0, RECIPIENT, 1).await.unwrap();
        assert!(!result.receipt.result);
        assert_eq!(result.receipt.code.as_deref(), Some("SIGERROR"));
    }

    #[tokio::test]
    async fn broadcast_transport_failure_maps_to_broadcast_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/wallet/createtransaction");
            then.status(200)
                .json_body(json!({ "txID": TXID, "raw_data": {} }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/wallet/broadcasttransaction");
            then.status(502).body("bad gateway");
        });

        let sender = sender_for(&server);
        let err = sender.send_trx(0, RECIPIENT, 1).await.unwrap_err();
        assert!(matches!(err, SendError::Broadcast(_)));
    }
}
