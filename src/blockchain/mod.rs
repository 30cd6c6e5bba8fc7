// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for the Tron network.
//!
//! This module provides functionality for:
//! - Building TRX and TRC-20 transfers via a full node
//! - Local transaction signing and address derivation
//! - Broadcasting signed transactions

pub mod client;
pub mod signing;
pub mod transactions;
pub mod trc20;
pub mod types;

pub use client::{TronClient, TronClientError};
pub use transactions::{SendError, SendResult, TxSender};
pub use types::*;
