// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TronGrid v1 API integration for confirmed account activity.
//!
//! Read side of the wallet: confirmed native transactions, TRC-20
//! transfers, and account snapshots. Listing responses arrive in a
//! `{ success, data }` envelope where a false flag or an empty array
//! means "nothing to report", never an error.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::blockchain::types::{AccountInfo, NativeTransaction, Network, Trc20Transfer};

/// Maximum records requested per listing query.
pub const PAGE_LIMIT: u32 = 200;

#[derive(Debug, thiserror::Error)]
pub enum TronGridError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("TronGrid request failed: {0}")]
    Request(String),

    #[error("TronGrid response was invalid: {0}")]
    InvalidResponse(String),
}

/// Envelope wrapping every TronGrid listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountPage<T> {
    #[serde(default)]
    pub success: bool,
    // The path form keeps the derived impl free of the `T: Default`
    // bound a plain `default` would infer.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> AccountPage<T> {
    /// True when the query succeeded and returned at least one record.
    pub fn has_records(&self) -> bool {
        self.success && !self.data.is_empty()
    }
}

/// HTTP client for the TronGrid v1 API.
#[derive(Debug, Clone)]
pub struct TronGridClient {
    base_url: String,
    http: Client,
}

impl TronGridClient {
    /// Create a client for the given v1 API base URL.
    pub fn new(api_base_url: &str) -> Result<Self, TronGridError> {
        let url = Url::parse(api_base_url)
            .map_err(|e| TronGridError::InvalidBaseUrl(format!("`{api_base_url}`: {e}")))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| TronGridError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Create a client for the given network.
    pub fn for_network(network: Network) -> Result<Self, TronGridError> {
        Self::new(network.config().api_base_url)
    }

    /// Confirmed native transactions involving `address`, newest first,
    /// at or after `min_timestamp` (unix millis).
    pub async fn account_transactions(
        &self,
        address: &str,
        min_timestamp: i64,
    ) -> Result<AccountPage<NativeTransaction>, TronGridError> {
        self.get_listing(&format!("/accounts/{address}/transactions"), min_timestamp)
            .await
    }

    /// Confirmed TRC-20 transfers involving `address`, newest first,
    /// at or after `min_timestamp` (unix millis).
    pub async fn account_trc20_transfers(
        &self,
        address: &str,
        min_timestamp: i64,
    ) -> Result<AccountPage<Trc20Transfer>, TronGridError> {
        self.get_listing(
            &format!("/accounts/{address}/transactions/trc20"),
            min_timestamp,
        )
        .await
    }

    /// Account snapshot for `address`. The page is empty for accounts the
    /// chain has not seen yet.
    pub async fn account_info(
        &self,
        address: &str,
    ) -> Result<AccountPage<AccountInfo>, TronGridError> {
        let query = [("only_confirmed", "true".to_string())];
        self.get(&format!("/accounts/{address}/"), &query).await
    }

    async fn get_listing<T: DeserializeOwned>(
        &self,
        path: &str,
        min_timestamp: i64,
    ) -> Result<AccountPage<T>, TronGridError> {
        let query = [
            ("only_confirmed", "true".to_string()),
            ("limit", PAGE_LIMIT.to_string()),
            ("min_timestamp", min_timestamp.to_string()),
        ];
        self.get(path, &query).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TronGridError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .map_err(|e| TronGridError::Request(format!("GET {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TronGridError::Request(format!(
                "GET {path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TronGridError::InvalidResponse(format!("GET {path} invalid JSON: {e}")))
    }
}
