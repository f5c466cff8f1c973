//! Hash locks and secret locks.
//!
//! A hash lock escrows funds while a bonded aggregate collects its
//! cosignatures. A secret lock escrows funds until someone reveals the
//! proof whose digest is the lock's secret; the matching secret proof
//! releases them.

use crate::config::{TransactionLimits, HASH_LENGTH};
use crate::crypto::hash::{double_sha256, hash160, sha3_256};
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::mosaic::Mosaic;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::model::unresolved::UnresolvedAddress;
use crate::receipt::resolver::ResolutionContext;
use crate::transaction::body::{check_network, BodyCodec};
use crate::transaction::codec::{Reader, Writer, MOSAIC_SIZE};
use crate::transaction::signing::SignedTransaction;
use crate::transaction::types::{LockHashAlgorithm, TransactionType};

impl LockHashAlgorithm {
    /// Secret for `proof` under this algorithm. HASH_160 digests are 20
    /// bytes and are zero-padded on the right.
    pub fn compute(self, proof: &[u8]) -> [u8; HASH_LENGTH] {
        match self {
            Self::Sha3_256 => sha3_256(proof),
            Self::Hash256 => double_sha256(proof),
            Self::Hash160 => {
                let mut secret = [0u8; HASH_LENGTH];
                secret[..20].copy_from_slice(&hash160(proof));
                secret
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Hash lock
// ---------------------------------------------------------------------------

/// ```text
/// mosaic    [id u64, amount u64]
/// duration  u64
/// hash      [u8; 32]   hash of the bonded aggregate
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashLockBody {
    pub mosaic: Mosaic,
    pub duration: UInt64,
    pub hash: [u8; HASH_LENGTH],
}

impl HashLockBody {
    /// Locks funds for `signed`, which must be a bonded aggregate.
    pub fn for_aggregate(mosaic: Mosaic, duration: impl Into<UInt64>, signed: &SignedTransaction) -> Result<Self> {
        if signed.transaction_type != TransactionType::AggregateBonded {
            return Err(Error::unsupported(format!(
                "hash locks only cover bonded aggregates, got {}",
                signed.transaction_type
            )));
        }
        Ok(Self {
            mosaic,
            duration: duration.into(),
            hash: signed.hash_bytes()?,
        })
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            mosaic: r.mosaic()?,
            duration: r.uint64()?,
            hash: r.array::<HASH_LENGTH>()?,
        })
    }
}

impl BodyCodec for HashLockBody {
    fn size(&self) -> usize {
        MOSAIC_SIZE + 8 + HASH_LENGTH
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.mosaic(&self.mosaic);
        w.uint64(self.duration);
        w.bytes(&self.hash);
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            mosaic: Mosaic::new(ctx.mosaic_id(&self.mosaic.id)?, self.mosaic.amount),
            ..*self
        })
    }

    fn has_aliases(&self) -> bool {
        self.mosaic.id.is_alias()
    }
}

// ---------------------------------------------------------------------------
// Secret lock / proof
// ---------------------------------------------------------------------------

/// ```text
/// recipient       [u8; 24]
/// secret          [u8; 32]
/// mosaic          [id u64, amount u64]
/// duration        u64
/// hash_algorithm  u8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretLockBody {
    pub recipient: UnresolvedAddress,
    pub secret: [u8; HASH_LENGTH],
    pub mosaic: Mosaic,
    pub duration: UInt64,
    pub hash_algorithm: LockHashAlgorithm,
}

impl SecretLockBody {
    pub fn new(
        recipient: impl Into<UnresolvedAddress>,
        mosaic: Mosaic,
        duration: impl Into<UInt64>,
        hash_algorithm: LockHashAlgorithm,
        secret: [u8; HASH_LENGTH],
    ) -> Self {
        Self {
            recipient: recipient.into(),
            secret,
            mosaic,
            duration: duration.into(),
            hash_algorithm,
        }
    }

    /// Lock whose secret is derived from `proof`.
    pub fn from_proof(
        recipient: impl Into<UnresolvedAddress>,
        mosaic: Mosaic,
        duration: impl Into<UInt64>,
        hash_algorithm: LockHashAlgorithm,
        proof: &[u8],
    ) -> Self {
        Self::new(recipient, mosaic, duration, hash_algorithm, hash_algorithm.compute(proof))
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            recipient: r.address()?,
            secret: r.array::<HASH_LENGTH>()?,
            mosaic: r.mosaic()?,
            duration: r.uint64()?,
            hash_algorithm: LockHashAlgorithm::try_from(r.u8()?)?,
        })
    }
}

impl BodyCodec for SecretLockBody {
    fn size(&self) -> usize {
        24 + HASH_LENGTH + MOSAIC_SIZE + 8 + 1
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        w.address(&self.recipient, network_type);
        w.bytes(&self.secret);
        w.mosaic(&self.mosaic);
        w.uint64(self.duration);
        w.u8(self.hash_algorithm.value());
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        check_network(&self.recipient, network_type)
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            recipient: ctx.address(&self.recipient)?,
            mosaic: Mosaic::new(ctx.mosaic_id(&self.mosaic.id)?, self.mosaic.amount),
            ..*self
        })
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.recipient.refers_to(address, aliases)
    }

    fn has_aliases(&self) -> bool {
        self.recipient.is_alias() || self.mosaic.id.is_alias()
    }
}

/// ```text
/// recipient       [u8; 24]
/// secret          [u8; 32]
/// proof_size      u16
/// hash_algorithm  u8
/// proof           [u8; proof_size]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretProofBody {
    pub recipient: UnresolvedAddress,
    pub secret: [u8; HASH_LENGTH],
    pub hash_algorithm: LockHashAlgorithm,
    pub proof: Vec<u8>,
}

impl SecretProofBody {
    pub fn new(
        recipient: impl Into<UnresolvedAddress>,
        hash_algorithm: LockHashAlgorithm,
        secret: [u8; HASH_LENGTH],
        proof: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            secret,
            hash_algorithm,
            proof: proof.into(),
        }
    }

    /// `true` when the proof hashes to the secret.
    pub fn is_consistent(&self) -> bool {
        self.hash_algorithm.compute(&self.proof) == self.secret
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let recipient = r.address()?;
        let secret = r.array::<HASH_LENGTH>()?;
        let proof_size = r.u16()? as usize;
        let hash_algorithm = LockHashAlgorithm::try_from(r.u8()?)?;
        let proof = r.bytes(proof_size)?.to_vec();
        Ok(Self {
            recipient,
            secret,
            hash_algorithm,
            proof,
        })
    }
}

impl BodyCodec for SecretProofBody {
    fn size(&self) -> usize {
        24 + HASH_LENGTH + 2 + 1 + self.proof.len()
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        w.address(&self.recipient, network_type);
        w.bytes(&self.secret);
        w.u16(self.proof.len() as u16);
        w.u8(self.hash_algorithm.value());
        w.bytes(&self.proof);
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        check_network(&self.recipient, network_type)?;
        if self.proof.len() > u16::MAX as usize {
            return Err(Error::invalid_argument(format!(
                "proof of {} bytes does not fit a u16 length",
                self.proof.len()
            )));
        }
        Ok(())
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            recipient: ctx.address(&self.recipient)?,
            ..self.clone()
        })
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.recipient.refers_to(address, aliases)
    }

    fn has_aliases(&self) -> bool {
        self.recipient.is_alias()
    }
}
