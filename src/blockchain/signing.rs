// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction signing for the Tron protocol.
//!
//! This module converts hex private keys to signers, derives base58check
//! Tron addresses from key material, and signs node-built transactions by
//! their `txID` digest.

use k256::ecdsa::{SigningKey, VerifyingKey};
use sha2::Sha256;
use sha3::{Digest, Keccak256};

/// Version byte prepended to the 20-byte account hash on Tron.
const TRON_ADDRESS_PREFIX: u8 = 0x41;

/// Decoded base58check address length: prefix byte plus 20-byte hash.
const ADDRESS_PAYLOAD_LEN: usize = 21;

/// Parse a hex-encoded 32-byte private key into a signer.
pub fn signing_key_from_hex(hex_key: &str) -> Result<SigningKey, SigningError> {
    let bytes = hex::decode(hex_key.trim())
        .map_err(|e| SigningError::InvalidPrivateKey(format!("not valid hex: {e}")))?;
    SigningKey::from_slice(&bytes).map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))
}

/// Derive the base58check Tron address for a hex private key.
pub fn address_from_private_key(hex_key: &str) -> Result<String, SigningError> {
    let signing_key = signing_key_from_hex(hex_key)?;
    Ok(address_from_public_key(signing_key.verifying_key()))
}

/// Derive the base58check Tron address for a public key.
///
/// Tron addresses hash the uncompressed public key (minus the SEC1 tag
/// byte) with Keccak-256, keep the low 20 bytes, and prepend `0x41`.
pub fn address_from_public_key(public_key: &VerifyingKey) -> String {
    let point = public_key.to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);

    let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
    payload[0] = TRON_ADDRESS_PREFIX;
    payload[1..].copy_from_slice(&digest[12..]);

    base58check_encode(&payload)
}

/// Decode a base58check Tron address into its 21-byte payload.
///
/// Verifies the double-SHA256 checksum and the `0x41` version byte, so a
/// mistyped address never reaches a transaction body.
pub fn decode_base58_address(address: &str) -> Result<[u8; ADDRESS_PAYLOAD_LEN], SigningError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SigningError::InvalidAddress(format!("`{address}`: {e}")))?;

    if bytes.len() != ADDRESS_PAYLOAD_LEN + 4 {
        return Err(SigningError::InvalidAddress(format!(
            "`{address}`: expected {} bytes, got {}",
            ADDRESS_PAYLOAD_LEN + 4,
            bytes.len()
        )));
    }

    let (payload, checksum) = bytes.split_at(ADDRESS_PAYLOAD_LEN);
    let digest = Sha256::digest(Sha256::digest(payload));
    if digest[..4] != *checksum {
        return Err(SigningError::InvalidAddress(format!(
            "`{address}`: checksum mismatch"
        )));
    }
    if payload[0] != TRON_ADDRESS_PREFIX {
        return Err(SigningError::InvalidAddress(format!(
            "`{address}`: not a Tron address (version byte {:#04x})",
            payload[0]
        )));
    }

    let mut out = [0u8; ADDRESS_PAYLOAD_LEN];
    out.copy_from_slice(payload);
    Ok(out)
}

/// Sign a node-built transaction in place and return it.
///
/// The node computes `txID` as the SHA-256 of the serialized transaction
/// body; signing that digest recoverably yields the 65-byte signature
/// (r, s, recovery id) Tron expects, attached as a one-element hex array.
pub fn sign_transaction(
    mut tx: serde_json::Value,
    hex_key: &str,
) -> Result<serde_json::Value, SigningError> {
    let tx_id = tx
        .get("txID")
        .and_then(|v| v.as_str())
        .ok_or_else(|| SigningError::MalformedTransaction("missing txID field".to_string()))?;

    let digest = hex::decode(tx_id)
        .map_err(|e| SigningError::MalformedTransaction(format!("txID is not hex: {e}")))?;
    if digest.len() != 32 {
        return Err(SigningError::MalformedTransaction(format!(
            "txID must be 32 bytes, got {}",
            digest.len()
        )));
    }

    let signing_key = signing_key_from_hex(hex_key)?;
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| SigningError::SigningFailed(e.to_string()))?;

    let mut sig_bytes = signature.to_bytes().to_vec();
    sig_bytes.push(recovery_id.to_byte());

    tx["signature"] = serde_json::json!([hex::encode(sig_bytes)]);
    Ok(tx)
}

fn base58check_encode(payload: &[u8]) -> String {
    let checksum = Sha256::digest(Sha256::digest(payload));
    let mut data = payload.to_vec();
    data.extend_from_slice(&checksum[..4]);
    bs58::encode(data).into_string()
}

/// Errors raised while handling key material or signing.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::RecoveryId;

    const TEST_KEY: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    #[test]
    fn address_round_trips_through_base58check() {
        let address = "TUfzSqg7C5ED2EnaXTTocTxPwFwXRxnhsp";
        let payload = decode_base58_address(address).unwrap();
        assert_eq!(payload[0], 0x41);
        assert_eq!(base58check_encode(&payload), address);
    }

    #[test]
    fn rejects_corrupted_address() {
        // Last character flipped; checksum no longer matches.
        let result = decode_base58_address("TUfzSqg7C5ED2EnaXTTocTxPwFwXRxnhsq");
        assert!(matches!(result, Err(SigningError::InvalidAddress(_))));
    }

    #[test]
    fn rejects_non_tron_version_byte() {
        // Bitcoin genesis address: valid base58check, version byte 0x00.
        let result = decode_base58_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
        assert!(matches!(result, Err(SigningError::InvalidAddress(_))));
    }

    #[test]
    fn rejects_bad_private_key() {
        assert!(matches!(
            signing_key_from_hex("not-hex"),
            Err(SigningError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            signing_key_from_hex("abcd"),
            Err(SigningError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn derived_address_is_stable() {
        let a = address_from_private_key(TEST_KEY).unwrap();
        let b = address_from_private_key(TEST_KEY).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with('T'));
        decode_base58_address(&a).unwrap();
    }

    #[test]
    fn signature_recovers_to_signer_address() {
        let tx_id = hex::encode(Sha256::digest(b"signing smoke test"));
        let tx = serde_json::json!({ "txID": tx_id, "raw_data": {} });

        let signed = sign_transaction(tx, TEST_KEY).unwrap();
        let sig_hex = signed["signature"][0].as_str().unwrap();
        assert_eq!(sig_hex.len(), 130);

        let sig_bytes = hex::decode(sig_hex).unwrap();
        let signature = k256::ecdsa::Signature::from_slice(&sig_bytes[..64]).unwrap();
        let recovery_id = RecoveryId::from_byte(sig_bytes[64]).unwrap();

        let digest = hex::decode(tx_id_of(&signed)).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id).unwrap();

        assert_eq!(
            address_from_public_key(&recovered),
            address_from_private_key(TEST_KEY).unwrap()
        );
    }

    #[test]
    fn signing_preserves_transaction_body() {
        let tx_id = hex::encode(Sha256::digest(b"body preservation"));
        let tx = serde_json::json!({
            "txID": tx_id,
            "raw_data": { "expiration": 1646916052313_i64 },
            "raw_data_hex": "0a02",
        });

        let signed = sign_transaction(tx, TEST_KEY).unwrap();
        assert_eq!(signed["raw_data"]["expiration"], 1646916052313_i64);
        assert_eq!(signed["raw_data_hex"], "0a02");
        assert_eq!(signed["signature"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn rejects_transaction_without_tx_id() {
        let tx = serde_json::json!({ "raw_data": {} });
        let result = sign_transaction(tx, TEST_KEY);
        assert!(matches!(result, Err(SigningError::MalformedTransaction(_))));
    }

    #[test]
    fn rejects_short_tx_id() {
        let tx = serde_json::json!({ "txID": "abcd" });
        let result = sign_transaction(tx, TEST_KEY);
        assert!(matches!(result, Err(SigningError::MalformedTransaction(_))));
    }

    fn tx_id_of(tx: &serde_json::Value) -> String {
        tx["txID"].as_str().unwrap().to_string()
    }
}
