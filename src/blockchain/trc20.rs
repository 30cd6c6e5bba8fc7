// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TRC-20 token contract interactions.
//!
//! TRC-20 transfers go through the full node's `triggersmartcontract`
//! endpoint, which takes the function selector and ABI-encoded parameters
//! as hex. Only `transfer(address,uint256)` is encoded here.

use super::signing::{self, SigningError};

/// Function selector for a TRC-20 transfer.
pub const TRANSFER_SELECTOR: &str = "transfer(address,uint256)";

/// Energy fee ceiling for a TRC-20 transfer, in sun (40 TRX).
pub const TRC20_FEE_LIMIT: u64 = 40_000_000;

/// ABI-encode the parameters of `transfer(address,uint256)`.
///
/// Both arguments occupy one 32-byte word: the recipient's 20-byte account
/// hash (version byte stripped) left-padded with zeros, then the amount as
/// a big-endian unsigned integer.
pub fn encode_transfer_params(to_address: &str, amount: u64) -> Result<String, SigningError> {
    let payload = signing::decode_base58_address(to_address)?;

    let mut params = String::with_capacity(128);
    params.push_str(&"0".repeat(24));
    params.push_str(&hex::encode(&payload[1..]));
    params.push_str(&format!("{amount:064x}"));
    Ok(params)
}
