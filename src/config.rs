// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and the startup
//! configuration loader. Configuration is read from the environment once at
//! startup; nothing is re-read while the process runs.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TRON_MNEMONIC` | 12 word seed phrase for HD key derivation | Required |
//! | `TRON_NETWORK` | Target network (`main` or `shasta`) | `shasta` |
//! | `TRON_HD_INDEXES` | Comma separated derivation indexes to watch | None |
//! | `TRON_WATCH_ADDRESSES` | Comma separated extra addresses to watch | None |
//! | `TRON_POLL_START_MS` | Initial poll cursor (unix millis) | Now at startup |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use crate::blockchain::Network;

/// Environment variable name for the seed phrase.
///
/// The phrase is held in memory for the lifetime of the process and never
/// written anywhere. Keys derive from it on demand.
pub const MNEMONIC_ENV: &str = "TRON_MNEMONIC";

/// Environment variable name for the network selector.
pub const NETWORK_ENV: &str = "TRON_NETWORK";

/// Environment variable name for the derivation indexes to watch.
pub const HD_INDEXES_ENV: &str = "TRON_HD_INDEXES";

/// Environment variable name for externally owned addresses to watch.
pub const WATCH_ADDRESSES_ENV: &str = "TRON_WATCH_ADDRESSES";

/// Environment variable name for the initial poll cursor.
pub const POLL_START_ENV: &str = "TRON_POLL_START_MS";

/// Environment variable name for the logging format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Startup configuration for the watcher binary.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub mnemonic: String,
    pub network: Network,
    pub hd_indexes: Vec<u32>,
    pub watch_addresses: Vec<String>,
    pub poll_start_ms: Option<i64>,
}

impl WalletConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mnemonic = env_required(MNEMONIC_ENV)?;
        let network =
            Network::parse(env_optional(NETWORK_ENV).as_deref()).map_err(ConfigError::Invalid)?;

        let hd_indexes = match env_optional(HD_INDEXES_ENV) {
            Some(raw) => parse_index_list(&raw)?,
            None => Vec::new(),
        };
        let watch_addresses = env_optional(WATCH_ADDRESSES_ENV)
            .map(|raw| parse_address_list(&raw))
            .unwrap_or_default();

        let poll_start_ms = match env_optional(POLL_START_ENV) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{POLL_START_ENV} must be unix milliseconds, got `{raw}`"
                ))
            })?),
            None => None,
        };

        Ok(Self {
            mnemonic,
            network,
            hd_indexes,
            watch_addresses,
            poll_start_ms,
        })
    }
}

/// The configured logging format, `pretty` unless overridden.
pub fn log_format() -> String {
    env_or_default(LOG_FORMAT_ENV, "pretty")
}

fn parse_index_list(raw: &str) -> Result<Vec<u32>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{HD_INDEXES_ENV} entry `{part}` is not an unsigned integer"
                ))
            })
        })
        .collect()
}

fn parse_address_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_required(name: &str) -> Result<String, ConfigError> {
    env_optional(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration missing: {0}")]
    Missing(String),

    #[error("Configuration invalid: {0}")]
    Invalid(String),
}
