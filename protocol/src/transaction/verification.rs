//! Cryptographic verification of signed transactions.
//!
//! These are pure checks on bytes a caller already holds: does the payload
//! decode, does its hash match, does its signature verify against the
//! declared signer, do an aggregate's cosignatures cover its hash. Whether
//! the ledger will accept the transaction (balances, multisig rules,
//! deadlines against node time) is out of reach here.
//!
//! The checks run from cheapest to most expensive, so an obviously
//! malformed payload never costs an Ed25519 verification.

use thiserror::Error;

use crate::config::HASH_LENGTH;
use crate::crypto::keys::PublicKey;
use crate::error::Error;
use crate::transaction::builder::Transaction;
use crate::transaction::signing::{signing_data, transaction_hash, SignedTransaction};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a signed transaction failed verification.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The payload does not decode as a transaction.
    #[error("malformed payload: {0}")]
    Malformed(#[from] Error),

    /// The payload carries no signature.
    #[error("transaction is unsigned")]
    MissingSignature,

    /// The signer in the payload differs from the one announced alongside it.
    #[error("payload signed by {actual}, announced as {expected}")]
    SignerMismatch { expected: PublicKey, actual: PublicKey },

    /// The announced hash differs from the hash recomputed from the payload.
    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    /// The Ed25519 signature does not verify against the signer.
    #[error("invalid signature by {signer}")]
    InvalidSignature { signer: PublicKey },

    /// A cosignature does not verify against the aggregate hash.
    #[error("invalid cosignature by {signer}")]
    InvalidCosignature { signer: PublicKey },
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a signed transaction against the network identified by
/// `generation_hash`.
///
/// The checks, in order:
///
/// 1. **Payload** must decode as a standalone transaction.
/// 2. **Signature present** in the payload.
/// 3. **Signer** in the payload must be the announced signer.
/// 4. **Hash** recomputed from the payload must equal the announced hash.
/// 5. **Signature** must verify over the generation hash and signing data.
/// 6. **Cosignatures**, for aggregates, must each verify over the hash.
pub fn verify_signed_transaction(
    signed: &SignedTransaction,
    generation_hash: &[u8; HASH_LENGTH],
) -> Result<(), VerificationError> {
    // 1. Decode.
    let payload = signed.payload_bytes()?;
    let tx = Transaction::from_payload(&payload)?;

    // 2-3. Signature slot and signer.
    let (signer, signature) = match (tx.signer(), tx.signature()) {
        (Some(signer), Some(signature)) => (*signer, *signature),
        _ => return Err(VerificationError::MissingSignature),
    };
    if signer != signed.signer {
        return Err(VerificationError::SignerMismatch {
            expected: signed.signer,
            actual: signer,
        });
    }

    // 4. Hash integrity.
    let hash = transaction_hash(&payload, generation_hash)?;
    let actual = hex::encode_upper(hash);
    if !actual.eq_ignore_ascii_case(&signed.hash) {
        return Err(VerificationError::HashMismatch {
            expected: signed.hash.clone(),
            actual,
        });
    }

    // 5. Initiator signature.
    let data = [generation_hash.as_slice(), signing_data(&payload)?].concat();
    if !signer.verify(&data, &signature) {
        return Err(VerificationError::InvalidSignature { signer });
    }

    // 6. Cosignatures.
    verify_cosignatures(&tx, &hash)
}

/// Verifies every cosignature of an aggregate over its transaction hash.
/// Non-aggregates have no cosignatures and pass trivially.
pub fn verify_cosignatures(tx: &Transaction, hash: &[u8; HASH_LENGTH]) -> Result<(), VerificationError> {
    match tx.cosignatures().iter().find(|c| !c.verify(hash)) {
        Some(bad) => Err(VerificationError::InvalidCosignature { signer: bad.signer }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
