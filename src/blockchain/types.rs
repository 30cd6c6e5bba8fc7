// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tron network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Full node HTTP endpoint (transaction build, sign, broadcast)
    pub full_node_url: &'static str,
    /// TronGrid v1 API base (confirmed transaction and account queries)
    pub api_base_url: &'static str,
}

/// Tron Mainnet configuration.
pub const TRON_MAINNET: NetworkConfig = NetworkConfig {
    name: "Tron Mainnet",
    full_node_url: "https://api.trongrid.io",
    api_base_url: "https://api.trongrid.io/v1",
};

/// Tron Shasta Testnet configuration.
pub const TRON_SHASTA: NetworkConfig = NetworkConfig {
    name: "Tron Shasta Testnet",
    full_node_url: "https://api.shasta.trongrid.io",
    api_base_url: "https://api.shasta.trongrid.io/v1",
};

/// Supported Tron networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Main,
    #[default]
    Shasta,
}

impl Network {
    /// Parse a network name, falling back to Shasta when absent.
    ///
    /// Unknown names are rejected rather than silently mapped to a default,
    /// so a typo in configuration cannot point the wallet at the wrong chain.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        let value = match raw {
            None => return Ok(Self::default()),
            Some(v) => v.trim().to_ascii_lowercase(),
        };
        match value.as_str() {
            "" => Ok(Self::default()),
            "main" => Ok(Self::Main),
            "shasta" => Ok(Self::Shasta),
            other => Err(format!(
                "Unknown network `{other}`; expected `main` or `shasta`."
            )),
        }
    }

    /// Endpoint configuration for this network.
    pub fn config(&self) -> &'static NetworkConfig {
        match self {
            Self::Main => &TRON_MAINNET,
            Self::Shasta => &TRON_SHASTA,
        }
    }
}

/// Outcome of a `broadcasttransaction` call.
///
/// `result: false` with a code/message is a node-side verdict on the
/// submitted transaction, not a transport failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastReceipt {
    /// Whether the node accepted the transaction
    #[serde(default)]
    pub result: bool,
    /// Transaction ID (hex), echoed back by the node
    #[serde(default)]
    pub txid: Option<String>,
    /// Rejection code when `result` is false (e.g. `SIGERROR`)
    #[serde(default)]
    pub code: Option<String>,
    /// Rejection detail, hex-encoded by the node
    #[serde(default)]
    pub message: Option<String>,
}

/// A confirmed transaction from the indexing API's account listing.
///
/// The API omits several fields depending on the contract type, so
/// everything defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeTransaction {
    #[serde(rename = "txID", default)]
    pub tx_id: String,
    #[serde(rename = "blockNumber", default)]
    pub block_number: i64,
    #[serde(default)]
    pub block_timestamp: i64,
    #[serde(default)]
    pub energy_fee: i64,
    #[serde(default)]
    pub energy_usage: i64,
    #[serde(default)]
    pub energy_usage_total: i64,
    #[serde(default)]
    pub net_fee: i64,
    #[serde(default)]
    pub net_usage: i64,
    #[serde(default)]
    pub internal_transactions: Vec<Value>,
    /// Raw transaction body, passed through untyped
    #[serde(default)]
    pub raw_data: Value,
    #[serde(default)]
    pub raw_data_hex: String,
    #[serde(default)]
    pub signature: Vec<String>,
    #[serde(default)]
    pub ret: Vec<TxResult>,
}

/// Per-contract execution result inside a confirmed transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxResult {
    #[serde(rename = "contractRet", default)]
    pub contract_ret: String,
    #[serde(default)]
    pub fee: i64,
}

/// A confirmed TRC-20 transfer from the indexing API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trc20Transfer {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub token_info: TokenInfo,
    #[serde(default)]
    pub block_timestamp: i64,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(rename = "type", default)]
    pub transfer_type: String,
    /// Amount in the token's smallest unit, as a decimal string
    #[serde(default)]
    pub value: String,
}

/// Token metadata attached to a TRC-20 transfer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub name: String,
}

/// Account snapshot from the indexing API's account endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    /// Native balance in sun
    #[serde(default)]
    pub balance: i64,
    /// TRC-20 holdings, one `{contract: amount}` object per token
    #[serde(default)]
    pub trc20: Vec<Value>,
}
