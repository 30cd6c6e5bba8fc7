// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tron full node client.
//!
//! Thin HTTP wrapper over the full node wallet API. Transactions are built
//! by the node (`createtransaction`, `triggersmartcontract`), signed
//! locally, and submitted back through `broadcasttransaction`. Requests use
//! `visible: true`, so addresses travel in base58check form.

use std::time::Duration;

use serde_json::{json, Value};
use url::Url;

use super::types::{BroadcastReceipt, Network, TRON_MAINNET, TRON_SHASTA};

/// Timeout applied to every full node request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for a Tron full node.
pub struct TronClient {
    http: reqwest::Client,
    base_url: String,
}

impl TronClient {
    /// Create a client for the specified full node endpoint.
    pub fn new(full_node_url: &str) -> Result<Self, TronClientError> {
        let url = Url::parse(full_node_url)
            .map_err(|e| TronClientError::InvalidNodeUrl(format!("`{full_node_url}`: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| TronClientError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for Tron Mainnet.
    pub fn mainnet() -> Result<Self, TronClientError> {
        Self::new(TRON_MAINNET.full_node_url)
    }

    /// Create a client for the Shasta testnet.
    pub fn shasta() -> Result<Self, TronClientError> {
        Self::new(TRON_SHASTA.full_node_url)
    }

    /// Create a client for the given network.
    pub fn for_network(network: Network) -> Result<Self, TronClientError> {
        Self::new(network.config().full_node_url)
    }

    /// Build an unsigned TRX transfer.
    ///
    /// The node returns the complete transaction body including `txID`.
    /// A response carrying an `Error` key is a build rejection.
    pub async fn create_transfer(
        &self,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<Value, TronClientError> {
        let body = json!({
            "owner_address": from,
            "to_address": to,
            "amount": amount,
            "visible": true,
        });
        let tx = self.post_json("/wallet/createtransaction", &body).await?;

        if let Some(reason) = tx.get("Error").and_then(|v| v.as_str()) {
            return Err(TronClientError::BuildRejected(reason.to_string()));
        }
        if tx.get("txID").and_then(|v| v.as_str()).is_none() {
            return Err(TronClientError::InvalidResponse(
                "createtransaction response missing txID".to_string(),
            ));
        }
        Ok(tx)
    }

    /// Build an unsigned smart contract call.
    ///
    /// The node wraps the transaction in an envelope whose `result.result`
    /// flag reports whether the call was accepted. Rejections carry a
    /// hex-encoded message, decoded here for the error.
    pub async fn trigger_smart_contract(
        &self,
        owner: &str,
        contract: &str,
        selector: &str,
        parameter: &str,
        fee_limit: u64,
    ) -> Result<Value, TronClientError> {
        let body = json!({
            "owner_address": owner,
            "contract_address": contract,
            "function_selector": selector,
            "parameter": parameter,
            "fee_limit": fee_limit,
            "call_value": 0,
            "visible": true,
        });
        let response = self.post_json("/wallet/triggersmartcontract", &body).await?;

        let accepted = response
            .pointer("/result/result")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !accepted {
            let reason = response
                .pointer("/result/message")
                .and_then(|v| v.as_str())
                .map(decode_node_message)
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(TronClientError::BuildRejected(reason));
        }

        response.get("transaction").cloned().ok_or_else(|| {
            TronClientError::InvalidResponse(
                "triggersmartcontract response missing transaction".to_string(),
            )
        })
    }

    /// Submit a signed transaction to the network.
    ///
    /// A `result: false` receipt is the node's verdict on the transaction
    /// and is returned as data, not as an error.
    pub async fn broadcast(&self, signed_tx: &Value) -> Result<BroadcastReceipt, TronClientError> {
        let response = self
            .post_json("/wallet/broadcasttransaction", signed_tx)
            .await?;
        serde_json::from_value(response).map_err(|e| {
            TronClientError::InvalidResponse(format!("broadcast receipt did not parse: {e}"))
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, TronClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TronClientError::Request(format!("POST {path}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TronClientError::Request(format!("POST {path}: {e}")))?;

        if !status.is_success() {
            return Err(TronClientError::InvalidResponse(format!(
                "POST {path} returned {status}: {text}"
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            TronClientError::InvalidResponse(format!("POST {path} returned non-JSON body: {e}"))
        })
    }
}

/// Decode a node rejection message, which is usually hex-encoded ASCII.
fn decode_node_message(raw: &str) -> String {
    hex::decode(raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_string())
}

/// Errors raised by the full node client.
#[derive(Debug, thiserror::Error)]
pub enum TronClientError {
    #[error("Invalid full node URL: {0}")]
    InvalidNodeUrl(String),

    #[error("Full node request failed: {0}")]
    Request(String),

    #[error("Unexpected full node response: {0}")]
    InvalidResponse(String),

    #[error("Transaction build rejected: {0}")]
    BuildRejected(String),
}
