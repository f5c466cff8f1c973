//! Mosaic definition, supply change and supply revocation bodies.

use crate::config::{TransactionLimits, MAX_MOSAIC_DIVISIBILITY};
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::mosaic::{Mosaic, MosaicFlags, MosaicId, MosaicNonce};
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::model::unresolved::{UnresolvedAddress, UnresolvedMosaicId};
use crate::receipt::resolver::ResolutionContext;
use crate::transaction::body::{check_network, BodyCodec};
use crate::transaction::codec::{Reader, Writer, MOSAIC_SIZE};
use crate::transaction::types::MosaicSupplyChangeAction;

/// Reads a canonical mosaic id; the namespace bit makes the payload invalid.
pub(crate) fn read_mosaic_id(r: &mut Reader) -> Result<MosaicId> {
    MosaicId::new(r.u64()?).map_err(|e| Error::invalid_format(e.to_string()))
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// ```text
/// id            u64
/// duration      u64    blocks, 0 = eternal
/// nonce         u32
/// flags         u8
/// divisibility  u8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicDefinitionBody {
    pub id: MosaicId,
    pub duration: UInt64,
    pub nonce: MosaicNonce,
    pub flags: MosaicFlags,
    pub divisibility: u8,
}

impl MosaicDefinitionBody {
    /// Derives the id from `nonce` and the owner's address, the way the
    /// ledger does.
    pub fn for_owner(
        owner: &Address,
        nonce: MosaicNonce,
        flags: MosaicFlags,
        divisibility: u8,
        duration: impl Into<UInt64>,
    ) -> Self {
        Self {
            id: MosaicId::from_nonce(nonce, owner),
            duration: duration.into(),
            nonce,
            flags,
            divisibility,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            id: read_mosaic_id(r)?,
            duration: r.uint64()?,
            nonce: MosaicNonce::new(r.u32()?),
            flags: MosaicFlags::from_byte(r.u8()?),
            divisibility: r.u8()?,
        })
    }
}

impl BodyCodec for MosaicDefinitionBody {
    fn size(&self) -> usize {
        8 + 8 + 4 + 1 + 1
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.u64(self.id.value());
        w.uint64(self.duration);
        w.u32(self.nonce.value());
        w.u8(self.flags.to_byte());
        w.u8(self.divisibility);
    }

    fn validate(&self, _network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        if self.divisibility > MAX_MOSAIC_DIVISIBILITY {
            return Err(Error::invalid_argument(format!(
                "divisibility {} exceeds {}",
                self.divisibility, MAX_MOSAIC_DIVISIBILITY
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Supply change
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicSupplyChangeBody {
    pub mosaic_id: UnresolvedMosaicId,
    pub delta: UInt64,
    pub action: MosaicSupplyChangeAction,
}

impl MosaicSupplyChangeBody {
    pub fn new(
        mosaic_id: impl Into<UnresolvedMosaicId>,
        action: MosaicSupplyChangeAction,
        delta: impl Into<UInt64>,
    ) -> Self {
        Self {
            mosaic_id: mosaic_id.into(),
            delta: delta.into(),
            action,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            mosaic_id: r.mosaic_id()?,
            delta: r.uint64()?,
            action: MosaicSupplyChangeAction::try_from(r.u8()?)?,
        })
    }
}

impl BodyCodec for MosaicSupplyChangeBody {
    fn size(&self) -> usize {
        8 + 8 + 1
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.mosaic_id(&self.mosaic_id);
        w.uint64(self.delta);
        w.u8(self.action.value());
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            mosaic_id: ctx.mosaic_id(&self.mosaic_id)?,
            ..*self
        })
    }

    fn has_aliases(&self) -> bool {
        self.mosaic_id.is_alias()
    }
}

// ---------------------------------------------------------------------------
// Supply revocation
// ---------------------------------------------------------------------------

/// Claws `mosaic` back from `source_address` to the mosaic creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicSupplyRevocationBody {
    pub source_address: UnresolvedAddress,
    pub mosaic: Mosaic,
}

impl MosaicSupplyRevocationBody {
    pub fn new(source_address: impl Into<UnresolvedAddress>, mosaic: Mosaic) -> Self {
        Self {
            source_address: source_address.into(),
            mosaic,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            source_address: r.address()?,
            mosaic: r.mosaic()?,
        })
    }
}

impl BodyCodec for MosaicSupplyRevocationBody {
    fn size(&self) -> usize {
        24 + MOSAIC_SIZE
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        w.address(&self.source_address, network_type);
        w.mosaic(&self.mosaic);
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        check_network(&self.source_address, network_type)
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            source_address: ctx.address(&self.source_address)?,
            mosaic: Mosaic::new(ctx.mosaic_id(&self.mosaic.id)?, self.mosaic.amount),
        })
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.source_address.refers_to(address, aliases)
    }

    fn has_aliases(&self) -> bool {
        self.source_address.is_alias() || self.mosaic.id.is_alias()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::PublicKey;
    use crate::model::namespace::NAMESPACE_FLAG;

    fn encode(body: &impl BodyCodec) -> Vec<u8> {
        let mut w = Writer::with_capacity(body.size());
        body.write(&mut w, NetworkType::TestNet);
        w.into_vec()
    }

    #[test]
    fn definition_id_follows_owner_and_nonce() {
        let owner = Address::from_public_key(&PublicKey::from_bytes([8u8; 32]), NetworkType::TestNet);
        let flags = MosaicFlags::new(true, true, false, false);
        let body = MosaicDefinitionBody::for_owner(&owner, MosaicNonce::new(5), flags, 6, 0u64);
        assert_eq!(body.id, MosaicId::from_nonce(MosaicNonce::new(5), &owner));

        let bytes = encode(&body);
        assert_eq!(bytes.len(), 22);
        assert_eq!(&bytes[16..22], &[5, 0, 0, 0, 0x03, 6]);
        assert_eq!(MosaicDefinitionBody::read(&mut Reader::new(&bytes)).unwrap(), body);
    }

    #[test]
    fn definition_divisibility_bound() {
        let owner = Address::from_public_key(&PublicKey::from_bytes([8u8; 32]), NetworkType::TestNet);
        let body = MosaicDefinitionBody::for_owner(&owner, MosaicNonce::new(1), MosaicFlags::default(), 7, 0u64);
        assert!(body
            .validate(NetworkType::TestNet, &TransactionLimits::default())
            .is_err());
    }

    #[test]
    fn flagged_definition_id_is_format_error() {
        let mut bytes = vec![0u8; 22];
        bytes[..8].copy_from_slice(&NAMESPACE_FLAG.to_le_bytes());
        let err = MosaicDefinitionBody::read(&mut Reader::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn supply_change_layout() {
        let body = MosaicSupplyChangeBody::new(
            MosaicId::new(0x10).unwrap(),
            MosaicSupplyChangeAction::Increase,
            1_000u64,
        );
        let bytes = encode(&body);
        assert_eq!(bytes.len(), 17);
        assert_eq!(bytes[16], 1);
        assert_eq!(MosaicSupplyChangeBody::read(&mut Reader::new(&bytes)).unwrap(), body);
    }

    #[test]
    fn revocation_notifies_source() {
        let source = Address::from_public_key(&PublicKey::from_bytes([4u8; 32]), NetworkType::TestNet);
        let body = MosaicSupplyRevocationBody::new(
            source,
            Mosaic::new(MosaicId::new(0x22).unwrap(), 3u64),
        );
        assert_eq!(encode(&body).len(), 40);
        assert!(body.notifies(&source, &[]));
        assert!(!body.has_aliases());
    }
}
