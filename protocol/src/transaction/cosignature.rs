//! Cosignatures on aggregate transactions.
//!
//! A cosignature is a signature over the aggregate's 32-byte transaction
//! hash, never over its bytes. Complete aggregates carry them inline;
//! bonded aggregates collect them after announcement as detached
//! [`CosignatureSignedTransaction`]s.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{COSIGNATURE_SIZE, HASH_LENGTH};
use crate::crypto::keys::{PublicKey, Signature};
use crate::error::{Error, Result};
use crate::model::account::{Account, PublicAccount};
use crate::model::network::NetworkType;
use crate::transaction::builder::Transaction;
use crate::transaction::codec::{Reader, Writer};
use crate::transaction::signing::{parse_hash, transaction_hash};

/// Version written in front of every cosignature.
pub const COSIGNATURE_VERSION: u64 = 0;

/// A cosignature as carried inside an aggregate.
///
/// ```text
/// version    u64
/// signer     [u8; 32]
/// signature  [u8; 64]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateCosignature {
    #[serde(default)]
    pub version: u64,
    #[serde(rename = "signerPublicKey")]
    pub signer: PublicKey,
    pub signature: Signature,
}

impl AggregateCosignature {
    pub fn new(signer: PublicKey, signature: Signature) -> Self {
        Self {
            version: COSIGNATURE_VERSION,
            signer,
            signature,
        }
    }

    /// Cosigns `hash` with `account`.
    pub fn sign(account: &Account, hash: &[u8; HASH_LENGTH]) -> Self {
        Self::new(account.public_key(), account.sign_data(hash))
    }

    pub fn signer_account(&self, network_type: NetworkType) -> PublicAccount {
        PublicAccount::new(self.signer, network_type)
    }

    /// `true` when this is a valid signature over `hash`.
    pub fn verify(&self, hash: &[u8; HASH_LENGTH]) -> bool {
        self.signer.verify(hash, &self.signature)
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.u64(self.version);
        w.bytes(self.signer.as_bytes());
        w.bytes(self.signature.as_bytes());
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            version: r.u64()?,
            signer: r.public_key()?,
            signature: Signature::from_bytes(r.array()?),
        })
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(COSIGNATURE_SIZE);
        self.write(&mut w);
        w.into_vec()
    }
}

impl From<&CosignatureSignedTransaction> for AggregateCosignature {
    fn from(signed: &CosignatureSignedTransaction) -> Self {
        Self {
            version: signed.version,
            signer: signed.signer_public_key,
            signature: signed.signature,
        }
    }
}

// ---------------------------------------------------------------------------
// Detached cosignatures
// ---------------------------------------------------------------------------

/// Request to cosign an announced aggregate, identified by its hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CosignatureTransaction {
    transaction_hash: [u8; HASH_LENGTH],
}

impl CosignatureTransaction {
    /// Cosigning request for an aggregate that came back from a node. The
    /// aggregate must carry its hash in its confirmation info.
    pub fn create(aggregate: &Transaction) -> Result<Self> {
        if !aggregate.transaction_type().is_aggregate() {
            return Err(Error::unsupported(format!(
                "only aggregates can be cosigned, got {}",
                aggregate.transaction_type()
            )));
        }
        let hash = aggregate
            .info()
            .and_then(|info| info.hash.as_deref())
            .ok_or_else(|| Error::invalid_argument("aggregate to cosign must be announced first"))?;
        Self::from_hash(hash)
    }

    pub fn from_hash(hash: &str) -> Result<Self> {
        Ok(Self {
            transaction_hash: parse_hash(hash)?,
        })
    }

    pub fn transaction_hash(&self) -> &[u8; HASH_LENGTH] {
        &self.transaction_hash
    }

    pub fn sign_with(&self, account: &Account) -> CosignatureSignedTransaction {
        let cosignature = AggregateCosignature::sign(account, &self.transaction_hash);
        debug!(hash = %hex::encode_upper(self.transaction_hash), "cosigned aggregate");
        CosignatureSignedTransaction::new(hex::encode_upper(self.transaction_hash), cosignature)
    }

    /// Cosigns a raw aggregate payload without decoding it.
    pub fn sign_payload(
        account: &Account,
        payload_hex: &str,
        generation_hash: &[u8; HASH_LENGTH],
    ) -> Result<CosignatureSignedTransaction> {
        let payload = hex::decode(payload_hex)?;
        let hash = transaction_hash(&payload, generation_hash)?;
        Ok(Self {
            transaction_hash: hash,
        }
        .sign_with(account))
    }
}

/// A cosignature ready to be sent to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignatureSignedTransaction {
    pub parent_hash: String,
    pub signature: Signature,
    pub signer_public_key: PublicKey,
    #[serde(default)]
    pub version: u64,
}

impl CosignatureSignedTransaction {
    pub fn new(parent_hash: String, cosignature: AggregateCosignature) -> Self {
        Self {
            parent_hash,
            signature: cosignature.signature,
            signer_public_key: cosignature.signer,
            version: cosignature.version,
        }
    }

    /// `true` when the signature covers `parent_hash`.
    pub fn verify(&self) -> bool {
        parse_hash(&self.parent_hash)
            .map(|hash| AggregateCosignature::from(self).verify(&hash))
            .unwrap_or(false)
    }
}
