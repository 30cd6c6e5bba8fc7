// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tronwatch - Tron HD Wallet Helper & Transaction Watcher
//!
//! This crate derives hierarchical deterministic wallet addresses from a
//! single seed phrase, signs and broadcasts TRX and TRC-20 transfers through
//! a Tron full node, and polls the TronGrid indexing API for newly confirmed
//! activity on a watched set of addresses, surfacing it as events.
//!
//! ## Modules
//!
//! - `keys` - HD key derivation cache (BIP39 seed, coin type 195)
//! - `blockchain` - Full node client, signing, and transfer submission
//! - `providers` - TronGrid indexing API client
//! - `watcher` - Polling engine and watch set
//! - `events` - Broadcast channel for confirmed-activity events
//! - `wallet` - Top-level facade tying the pieces together
//! - `config` - Environment configuration

pub mod blockchain;
pub mod config;
pub mod events;
pub mod keys;
pub mod providers;
pub mod wallet;
pub mod watcher;
