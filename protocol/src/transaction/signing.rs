//! Transaction signing.
//!
//! Signing is a separate step from building because the account may not be
//! available at construction time (hardware wallet, remote signer, a
//! multisig cosigner on another machine).
//!
//! What gets signed is the network's generation hash followed by the
//! payload from offset 108 onwards, i.e. everything after the size,
//! signature and signer slots. Aggregates only sign the header tail and
//! their transactions hash, so cosignatures can be appended later without
//! invalidating the initiator's signature:
//!
//! ```text
//! regular     gen_hash || payload[108..]
//! aggregate   gen_hash || payload[108..160]
//! ```
//!
//! The transaction hash binds the signer and the R half of the signature
//! as well: `SHA3-256(signature[..32] || signer || gen_hash || signing data)`.
//! The S half is left out, so the hash matches the one the ledger computes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{
    AGGREGATE_SIGNING_DATA_LENGTH, HASH_LENGTH, SIGNATURE_LENGTH, SIGNATURE_OFFSET, SIGNER_OFFSET,
    SIGNING_DATA_OFFSET, TRANSACTION_HEADER_SIZE,
};
use crate::crypto::hash::sha3_256_multi;
use crate::crypto::keys::PublicKey;
use crate::error::{Error, Result};
use crate::model::account::Account;
use crate::model::network::NetworkType;
use crate::transaction::builder::Transaction;
use crate::transaction::types::TransactionType;

/// Offset of the transaction type inside a standalone payload.
const TYPE_OFFSET: usize = SIGNING_DATA_OFFSET + 2;

/// End of the signature's R half, the only part of it the hash covers.
const SIGNATURE_R_END: usize = SIGNATURE_OFFSET + SIGNATURE_LENGTH / 2;

/// A signed transaction ready to be announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// Uppercase hex of the signed wire form.
    pub payload: String,
    /// Uppercase hex of the transaction hash.
    pub hash: String,
    #[serde(rename = "signerPublicKey")]
    pub signer: PublicKey,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub network_type: NetworkType,
}

impl SignedTransaction {
    pub(crate) fn new(signed: &Transaction, hash: [u8; HASH_LENGTH]) -> Self {
        Self {
            payload: signed.to_hex(),
            hash: hex::encode_upper(hash),
            signer: signed.signer().copied().unwrap_or_default(),
            transaction_type: signed.transaction_type(),
            network_type: signed.network_type(),
        }
    }

    pub fn hash_bytes(&self) -> Result<[u8; HASH_LENGTH]> {
        parse_hash(&self.hash)
    }

    pub fn payload_bytes(&self) -> Result<Vec<u8>> {
        Ok(hex::decode(&self.payload)?)
    }
}

impl Transaction {
    /// Signs with `account` for the network identified by
    /// `generation_hash`.
    pub fn sign_with(&self, account: &Account, generation_hash: &[u8; HASH_LENGTH]) -> Result<SignedTransaction> {
        let (signed, hash) = self.sign_parts(account, generation_hash)?;
        debug!(
            transaction_type = %signed.transaction_type(),
            hash = %hex::encode_upper(hash),
            "signed transaction"
        );
        Ok(SignedTransaction::new(&signed, hash))
    }

    /// The signed copy and its hash.
    pub(crate) fn sign_parts(
        &self,
        account: &Account,
        generation_hash: &[u8; HASH_LENGTH],
    ) -> Result<(Transaction, [u8; HASH_LENGTH])> {
        if account.network_type() != self.network_type() {
            return Err(Error::invalid_argument(format!(
                "signer is on {}, transaction targets {}",
                account.network_type(),
                self.network_type()
            )));
        }
        let unsigned = self.serialize();
        let data = signing_data(&unsigned)?;
        let signature = account.sign_data(&[generation_hash.as_slice(), data].concat());
        let signed = self.with_signature(account.public_key(), signature);
        let hash = transaction_hash(&signed.serialize(), generation_hash)?;
        Ok((signed, hash))
    }
}

/// The signed region of a standalone payload, without the generation hash.
pub fn signing_data(payload: &[u8]) -> Result<&[u8]> {
    if payload.len() < TRANSACTION_HEADER_SIZE {
        return Err(Error::invalid_format(format!(
            "payload of {} bytes is shorter than the {} byte header",
            payload.len(),
            TRANSACTION_HEADER_SIZE
        )));
    }
    let raw_type = u16::from_le_bytes([payload[TYPE_OFFSET], payload[TYPE_OFFSET + 1]]);
    let transaction_type = TransactionType::try_from(raw_type)?;
    if !transaction_type.is_aggregate() {
        return Ok(&payload[SIGNING_DATA_OFFSET..]);
    }
    let end = SIGNING_DATA_OFFSET + AGGREGATE_SIGNING_DATA_LENGTH;
    payload.get(SIGNING_DATA_OFFSET..end).ok_or_else(|| {
        Error::invalid_format(format!(
            "aggregate payload of {} bytes is missing its transactions hash",
            payload.len()
        ))
    })
}

/// Hash of a signed standalone payload on the network identified by
/// `generation_hash`.
pub fn transaction_hash(payload: &[u8], generation_hash: &[u8; HASH_LENGTH]) -> Result<[u8; HASH_LENGTH]> {
    let data = signing_data(payload)?;
    Ok(sha3_256_multi(&[
        &payload[SIGNATURE_OFFSET..SIGNATURE_R_END],
        &payload[SIGNER_OFFSET..SIGNING_DATA_OFFSET - 4],
        generation_hash,
        data,
    ]))
}

/// Decodes a 32-byte hash from hex.
pub fn parse_hash(hash: &str) -> Result<[u8; HASH_LENGTH]> {
    let bytes = hex::decode(hash)?;
    bytes.as_slice().try_into().map_err(|_| {
        Error::invalid_argument(format!(
            "hash must be {} bytes, got {}",
            HASH_LENGTH,
            bytes.len()
        ))
    })
}

/// Decodes a network generation hash from hex.
pub fn parse_generation_hash(generation_hash: &str) -> Result<[u8; HASH_LENGTH]> {
    parse_hash(generation_hash)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
