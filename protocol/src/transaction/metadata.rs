//! Metadata attached to accounts, mosaics and namespaces.
//!
//! All three bodies start with the target account and a scoped key and end
//! with the value. Mosaic and namespace metadata add the target id in
//! between.
//!
//! ```text
//! target_address       [u8; 24]
//! scoped_metadata_key  u64
//! target_id            u64        mosaic / namespace metadata only
//! value_size_delta     i16
//! value_size           u16
//! value                [u8; value_size]
//! ```

use crate::config::{TransactionLimits, MAX_METADATA_VALUE_SIZE};
use crate::crypto::hash::sha3_256;
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::model::unresolved::{UnresolvedAddress, UnresolvedMosaicId};
use crate::receipt::resolver::ResolutionContext;
use crate::transaction::body::{check_network, BodyCodec};
use crate::transaction::codec::{Reader, Writer};

/// Scoped metadata key derived from a human-readable name: the first eight
/// bytes of its SHA3-256 digest, little-endian, with the high bit set.
pub fn metadata_key(name: &str) -> UInt64 {
    let digest = sha3_256(name.as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    UInt64::new(u64::from_le_bytes(word) | (1 << 63))
}

/// Fields shared by all metadata bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataValue {
    pub target_address: UnresolvedAddress,
    pub scoped_metadata_key: UInt64,
    /// Change in value length relative to the value already stored.
    pub value_size_delta: i16,
    pub value: Vec<u8>,
}

impl MetadataValue {
    pub fn new(
        target_address: impl Into<UnresolvedAddress>,
        scoped_metadata_key: impl Into<UInt64>,
        value_size_delta: i16,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            target_address: target_address.into(),
            scoped_metadata_key: scoped_metadata_key.into(),
            value_size_delta,
            value: value.into(),
        }
    }

    /// Value for a key that has no stored value yet.
    pub fn fresh(
        target_address: impl Into<UnresolvedAddress>,
        scoped_metadata_key: impl Into<UInt64>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        let value = value.into();
        let delta = i16::try_from(value.len()).unwrap_or(i16::MAX);
        Self::new(target_address, scoped_metadata_key, delta, value)
    }

    fn write_head(&self, w: &mut Writer, network_type: NetworkType) {
        w.address(&self.target_address, network_type);
        w.uint64(self.scoped_metadata_key);
    }

    fn write_tail(&self, w: &mut Writer) {
        w.i16(self.value_size_delta);
        w.u16(self.value.len() as u16);
        w.bytes(&self.value);
    }

    fn read_head(r: &mut Reader) -> Result<(UnresolvedAddress, UInt64)> {
        Ok((r.address()?, r.uint64()?))
    }

    fn read_tail(r: &mut Reader, target_address: UnresolvedAddress, key: UInt64) -> Result<Self> {
        let value_size_delta = r.i16()?;
        let value_size = r.u16()? as usize;
        let value = r.bytes(value_size)?.to_vec();
        Ok(Self::new(target_address, key, value_size_delta, value))
    }

    fn size(&self) -> usize {
        24 + 8 + 2 + 2 + self.value.len()
    }

    fn validate(&self, network_type: NetworkType) -> Result<()> {
        check_network(&self.target_address, network_type)?;
        if self.value.len() > MAX_METADATA_VALUE_SIZE {
            return Err(Error::invalid_argument(format!(
                "metadata value of {} bytes exceeds the {} byte limit",
                self.value.len(),
                MAX_METADATA_VALUE_SIZE
            )));
        }
        Ok(())
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            target_address: ctx.address(&self.target_address)?,
            ..self.clone()
        })
    }
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMetadataBody {
    pub metadata: MetadataValue,
}

impl AccountMetadataBody {
    pub fn new(metadata: MetadataValue) -> Self {
        Self { metadata }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let (target, key) = MetadataValue::read_head(r)?;
        Ok(Self::new(MetadataValue::read_tail(r, target, key)?))
    }
}

impl BodyCodec for AccountMetadataBody {
    fn size(&self) -> usize {
        self.metadata.size()
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        self.metadata.write_head(w, network_type);
        self.metadata.write_tail(w);
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        self.metadata.validate(network_type)
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self::new(self.metadata.resolve(ctx)?))
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.metadata.target_address.refers_to(address, aliases)
    }

    fn has_aliases(&self) -> bool {
        self.metadata.target_address.is_alias()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicMetadataBody {
    pub metadata: MetadataValue,
    pub target_mosaic_id: UnresolvedMosaicId,
}

impl MosaicMetadataBody {
    pub fn new(metadata: MetadataValue, target_mosaic_id: impl Into<UnresolvedMosaicId>) -> Self {
        Self {
            metadata,
            target_mosaic_id: target_mosaic_id.into(),
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let (target, key) = MetadataValue::read_head(r)?;
        let target_mosaic_id = r.mosaic_id()?;
        Ok(Self::new(MetadataValue::read_tail(r, target, key)?, target_mosaic_id))
    }
}

impl BodyCodec for MosaicMetadataBody {
    fn size(&self) -> usize {
        self.metadata.size() + 8
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        self.metadata.write_head(w, network_type);
        w.mosaic_id(&self.target_mosaic_id);
        self.metadata.write_tail(w);
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        self.metadata.validate(network_type)
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self::new(
            self.metadata.resolve(ctx)?,
            ctx.mosaic_id(&self.target_mosaic_id)?,
        ))
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.metadata.target_address.refers_to(address, aliases)
    }

    fn has_aliases(&self) -> bool {
        self.metadata.target_address.is_alias() || self.target_mosaic_id.is_alias()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceMetadataBody {
    pub metadata: MetadataValue,
    pub target_namespace_id: NamespaceId,
}

impl NamespaceMetadataBody {
    pub fn new(metadata: MetadataValue, target_namespace_id: NamespaceId) -> Self {
        Self {
            metadata,
            target_namespace_id,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let (target, key) = MetadataValue::read_head(r)?;
        let target_namespace_id = NamespaceId::new(r.u64()?);
        Ok(Self::new(MetadataValue::read_tail(r, target, key)?, target_namespace_id))
    }
}

impl BodyCodec for NamespaceMetadataBody {
    fn size(&self) -> usize {
        self.metadata.size() + 8
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        self.metadata.write_head(w, network_type);
        w.u64(self.target_namespace_id.value());
        self.metadata.write_tail(w);
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        self.metadata.validate(network_type)
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self::new(self.metadata.resolve(ctx)?, self.target_namespace_id))
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.metadata.target_address.refers_to(address, aliases)
    }

    fn has_aliases(&self) -> bool {
        self.metadata.target_address.is_alias()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::PublicKey;
    use crate::model::mosaic::MosaicId;

    fn target() -> Address {
        Address::from_public_key(&PublicKey::from_bytes([5u8; 32]), NetworkType::TestNet)
    }

    fn encode(body: &impl BodyCodec) -> Vec<u8> {
        let mut w = Writer::with_capacity(body.size());
        body.write(&mut w, NetworkType::TestNet);
        w.into_vec()
    }

    #[test]
    fn key_from_name_sets_high_bit() {
        let key = metadata_key("email");
        assert!(key.value() & (1 << 63) != 0);
        assert_eq!(key, metadata_key("email"));
        assert_ne!(key, metadata_key("phone"));
    }

    #[test]
    fn mosaic_metadata_layout() {
        let mosaic = MosaicId::new(0x00AB_CDEF).unwrap();
        let body = MosaicMetadataBody::new(MetadataValue::fresh(target(), 7u64, b"abc".to_vec()), mosaic);
        let bytes = encode(&body);
        assert_eq!(bytes.len(), body.size());
        assert_eq!(&bytes[24..32], &7u64.to_le_bytes());
        assert_eq!(&bytes[32..40], &0x00AB_CDEFu64.to_le_bytes());
        assert_eq!(&bytes[40..44], &[3, 0, 3, 0]);
        assert_eq!(&bytes[44..], b"abc");
        assert_eq!(MosaicMetadataBody::read(&mut Reader::new(&bytes)).unwrap(), body);
    }

    #[test]
    fn negative_delta_survives_decode() {
        let body = AccountMetadataBody::new(MetadataValue::new(target(), 1u64, -4, b"ab".to_vec()));
        let bytes = encode(&body);
        assert_eq!(AccountMetadataBody::read(&mut Reader::new(&bytes)).unwrap(), body);
    }

    #[test]
    fn oversized_value_rejected() {
        let body = NamespaceMetadataBody::new(
            MetadataValue::fresh(target(), 1u64, vec![0u8; MAX_METADATA_VALUE_SIZE + 1]),
            NamespaceId::new(9),
        );
        assert!(body
            .validate(NetworkType::TestNet, &TransactionLimits::default())
            .is_err());
    }

    #[test]
    fn target_is_notified() {
        let body = AccountMetadataBody::new(MetadataValue::fresh(target(), 1u64, b"x".to_vec()));
        assert!(body.notifies(&target(), &[]));
        assert!(!body.has_aliases());
    }
}
