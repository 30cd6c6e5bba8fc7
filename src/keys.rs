// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # HD Key Store
//!
//! Derives Tron key pairs from a single 12-word seed phrase and memoizes
//! them by derivation index. Derivation is a pure function of seed + index,
//! so a cached record is never recomputed; the cache only grows.
//!
//! The seed is computed synchronously at construction time. Once `new`
//! returns, every derivation call is served without further setup.

use std::collections::HashMap;
use std::sync::Mutex;

use bip32::XPrv;
use bip39::{Language, Mnemonic};

use crate::blockchain::signing::{self, SigningError};

/// SLIP-44 coin type for Tron.
const TRON_COIN_TYPE: u32 = 195;

/// Number of words required in the seed phrase.
const MNEMONIC_WORDS: usize = 12;

/// A derived key pair: base58check Tron address plus the hex-encoded
/// private key scalar. Immutable once cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Base58check address (`T...`)
    pub address: String,
    /// Hex-encoded 32-byte private key, no prefix
    pub private_key_hex: String,
}

/// In-memory key derivation cache keyed by index.
///
/// Lookups for the same index always return the same record. The cache is
/// unbounded; entries live for the lifetime of the store.
pub struct KeyStore {
    seed: [u8; 64],
    keys: Mutex<HashMap<u32, KeyRecord>>,
}

impl KeyStore {
    /// Build a key store from a 12-word seed phrase.
    ///
    /// Fails with [`KeyError::InvalidSeedPhrase`] if the phrase is not
    /// exactly 12 words or does not parse as a BIP39 English mnemonic.
    pub fn new(mnemonic: &str) -> Result<Self, KeyError> {
        let word_count = mnemonic.split_whitespace().count();
        if word_count != MNEMONIC_WORDS {
            return Err(KeyError::InvalidSeedPhrase(format!(
                "expected {MNEMONIC_WORDS} words, got {word_count}"
            )));
        }

        let parsed = Mnemonic::parse_in(Language::English, mnemonic.trim())
            .map_err(|e| KeyError::InvalidSeedPhrase(e.to_string()))?;
        let seed = parsed.to_seed("");

        Ok(Self {
            seed,
            keys: Mutex::new(HashMap::new()),
        })
    }

    /// Return the cached record for `index`, deriving and caching it first
    /// if this is the first request for that index.
    pub fn derive_or_get(&self, index: u32) -> Result<KeyRecord, KeyError> {
        if let Ok(keys) = self.keys.lock() {
            if let Some(record) = keys.get(&index) {
                return Ok(record.clone());
            }
        }

        let record = self.derive_keypair(index)?;

        if let Ok(mut keys) = self.keys.lock() {
            keys.entry(index).or_insert_with(|| record.clone());
        }

        Ok(record)
    }

    /// Tron address for the given derivation index.
    pub fn address(&self, index: u32) -> Result<String, KeyError> {
        Ok(self.derive_or_get(index)?.address)
    }

    /// Hex-encoded private key for the given derivation index.
    ///
    /// Used by the transaction sender; handle with care.
    pub fn private_key(&self, index: u32) -> Result<String, KeyError> {
        Ok(self.derive_or_get(index)?.private_key_hex)
    }

    /// Derive the key pair at `m/44'/195'/{index}'/0/0`.
    fn derive_keypair(&self, index: u32) -> Result<KeyRecord, KeyError> {
        let path = format!("m/44'/{TRON_COIN_TYPE}'/{index}'/0/0");
        let path = path
            .parse()
            .map_err(|_| KeyError::Derivation(format!("invalid derivation path for index {index}")))?;

        let xprv = XPrv::derive_from_path(&self.seed, &path)
            .map_err(|e| KeyError::Derivation(e.to_string()))?;

        let private_key_hex = hex::encode(xprv.private_key().to_bytes());
        let address = signing::address_from_private_key(&private_key_hex)?;

        Ok(KeyRecord {
            address,
            private_key_hex,
        })
    }
}

/// Errors raised by the key store.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),

    #[error("Key derivation failed: {0}")]
    Derivation(String),

    #[error("Address conversion failed: {0}")]
    Address(#[from] SigningError),
}
