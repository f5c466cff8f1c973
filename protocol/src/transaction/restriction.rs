//! Account and mosaic restriction bodies.
//!
//! Account restrictions share one shape: flags, two counts, a reserved
//! word, then the added and removed values. Only the value type differs, so
//! the shape is generic over [`RestrictionValue`].

use crate::config::TransactionLimits;
use crate::error::Result;
use crate::model::address::Address;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::model::unresolved::{UnresolvedAddress, UnresolvedMosaicId};
use crate::receipt::resolver::ResolutionContext;
use crate::transaction::body::{check_count, check_network, read_list, BodyCodec};
use crate::transaction::codec::{Reader, Writer};
use crate::transaction::types::{
    AddressRestrictionFlag, MosaicRestrictionFlag, MosaicRestrictionType, OperationRestrictionFlag,
    TransactionType,
};

/// A value an account restriction can add or remove.
pub trait RestrictionValue: Sized + Clone + PartialEq {
    const SIZE: usize;

    fn write(&self, w: &mut Writer, network_type: NetworkType);

    fn read(r: &mut Reader) -> Result<Self>;
}

impl RestrictionValue for UnresolvedAddress {
    const SIZE: usize = 24;

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        w.address(self, network_type);
    }

    fn read(r: &mut Reader) -> Result<Self> {
        r.address()
    }
}

impl RestrictionValue for UnresolvedMosaicId {
    const SIZE: usize = 8;

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.mosaic_id(self);
    }

    fn read(r: &mut Reader) -> Result<Self> {
        r.mosaic_id()
    }
}

impl RestrictionValue for TransactionType {
    const SIZE: usize = 2;

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.u16(self.value());
    }

    fn read(r: &mut Reader) -> Result<Self> {
        TransactionType::try_from(r.u16()?)
    }
}

/// ```text
/// restriction_flags  u16
/// additions_count    u8
/// deletions_count    u8
/// reserved           u32
/// additions          [V; additions_count]
/// deletions          [V; deletions_count]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRestrictionBody<F, V> {
    pub flags: F,
    pub additions: Vec<V>,
    pub deletions: Vec<V>,
}

pub type AccountAddressRestrictionBody = AccountRestrictionBody<AddressRestrictionFlag, UnresolvedAddress>;
pub type AccountMosaicRestrictionBody = AccountRestrictionBody<MosaicRestrictionFlag, UnresolvedMosaicId>;
pub type AccountOperationRestrictionBody = AccountRestrictionBody<OperationRestrictionFlag, TransactionType>;

impl<F, V> AccountRestrictionBody<F, V>
where
    F: Copy + TryFrom<u16, Error = crate::error::Error> + Into<u16>,
    V: RestrictionValue,
{
    pub fn new(flags: F, additions: Vec<V>, deletions: Vec<V>) -> Self {
        Self {
            flags,
            additions,
            deletions,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let flags = F::try_from(r.u16()?)?;
        let additions_count = r.u8()? as usize;
        let deletions_count = r.u8()? as usize;
        r.skip(4)?;
        let additions = read_list(r, additions_count, V::read)?;
        let deletions = read_list(r, deletions_count, V::read)?;
        Ok(Self::new(flags, additions, deletions))
    }

    fn encoded_size(&self) -> usize {
        2 + 1 + 1 + 4 + V::SIZE * (self.additions.len() + self.deletions.len())
    }

    fn encode(&self, w: &mut Writer, network_type: NetworkType) {
        w.u16(self.flags.into());
        w.u8(self.additions.len() as u8);
        w.u8(self.deletions.len() as u8);
        w.u32(0);
        for value in self.additions.iter().chain(&self.deletions) {
            value.write(w, network_type);
        }
    }

    fn check_counts(&self) -> Result<()> {
        check_count("restriction additions", self.additions.len())?;
        check_count("restriction deletions", self.deletions.len())
    }
}

impl BodyCodec for AccountAddressRestrictionBody {
    fn size(&self) -> usize {
        self.encoded_size()
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        self.encode(w, network_type)
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        self.check_counts()?;
        self.additions
            .iter()
            .chain(&self.deletions)
            .try_for_each(|a| check_network(a, network_type))
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self::new(
            self.flags,
            ctx.addresses(&self.additions)?,
            ctx.addresses(&self.deletions)?,
        ))
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.additions
            .iter()
            .chain(&self.deletions)
            .any(|a| a.refers_to(address, aliases))
    }

    fn has_aliases(&self) -> bool {
        self.additions.iter().chain(&self.deletions).any(UnresolvedAddress::is_alias)
    }
}

impl BodyCodec for AccountMosaicRestrictionBody {
    fn size(&self) -> usize {
        self.encoded_size()
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        self.encode(w, network_type)
    }

    fn validate(&self, _network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        self.check_counts()
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self::new(
            self.flags,
            ctx.mosaic_ids(&self.additions)?,
            ctx.mosaic_ids(&self.deletions)?,
        ))
    }

    fn has_aliases(&self) -> bool {
        self.additions.iter().chain(&self.deletions).any(UnresolvedMosaicId::is_alias)
    }
}

impl BodyCodec for AccountOperationRestrictionBody {
    fn size(&self) -> usize {
        self.encoded_size()
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        self.encode(w, network_type)
    }

    fn validate(&self, _network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        self.check_counts()
    }
}

// ---------------------------------------------------------------------------
// Mosaic restrictions
// ---------------------------------------------------------------------------

/// Network-wide rule on a mosaic, optionally keyed off another mosaic's
/// restriction.
///
/// ```text
/// mosaic_id                    u64
/// reference_mosaic_id          u64   0 = this mosaic
/// restriction_key              u64
/// previous_restriction_value   u64
/// new_restriction_value        u64
/// previous_restriction_type    u8
/// new_restriction_type         u8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicGlobalRestrictionBody {
    pub mosaic_id: UnresolvedMosaicId,
    pub reference_mosaic_id: UnresolvedMosaicId,
    pub restriction_key: UInt64,
    pub previous_restriction_value: UInt64,
    pub new_restriction_value: UInt64,
    pub previous_restriction_type: MosaicRestrictionType,
    pub new_restriction_type: MosaicRestrictionType,
}

impl MosaicGlobalRestrictionBody {
    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            mosaic_id: r.mosaic_id()?,
            reference_mosaic_id: r.mosaic_id()?,
            restriction_key: r.uint64()?,
            previous_restriction_value: r.uint64()?,
            new_restriction_value: r.uint64()?,
            previous_restriction_type: MosaicRestrictionType::try_from(r.u8()?)?,
            new_restriction_type: MosaicRestrictionType::try_from(r.u8()?)?,
        })
    }
}

impl BodyCodec for MosaicGlobalRestrictionBody {
    fn size(&self) -> usize {
        8 * 5 + 2
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.mosaic_id(&self.mosaic_id);
        w.mosaic_id(&self.reference_mosaic_id);
        w.uint64(self.restriction_key);
        w.uint64(self.previous_restriction_value);
        w.uint64(self.new_restriction_value);
        w.u8(self.previous_restriction_type.value());
        w.u8(self.new_restriction_type.value());
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            mosaic_id: ctx.mosaic_id(&self.mosaic_id)?,
            reference_mosaic_id: ctx.mosaic_id(&self.reference_mosaic_id)?,
            ..*self
        })
    }

    fn has_aliases(&self) -> bool {
        self.mosaic_id.is_alias() || self.reference_mosaic_id.is_alias()
    }
}

/// Per-account value of a mosaic restriction key.
///
/// ```text
/// mosaic_id                    u64
/// restriction_key              u64
/// previous_restriction_value   u64
/// new_restriction_value        u64
/// target_address               [u8; 24]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicAddressRestrictionBody {
    pub mosaic_id: UnresolvedMosaicId,
    pub restriction_key: UInt64,
    pub previous_restriction_value: UInt64,
    pub new_restriction_value: UInt64,
    pub target_address: UnresolvedAddress,
}

impl MosaicAddressRestrictionBody {
    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            mosaic_id: r.mosaic_id()?,
            restriction_key: r.uint64()?,
            previous_restriction_value: r.uint64()?,
            new_restriction_value: r.uint64()?,
            target_address: r.address()?,
        })
    }
}

impl BodyCodec for MosaicAddressRestrictionBody {
    fn size(&self) -> usize {
        8 * 4 + 24
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        w.mosaic_id(&self.mosaic_id);
        w.uint64(self.restriction_key);
        w.uint64(self.previous_restriction_value);
        w.uint64(self.new_restriction_value);
        w.address(&self.target_address, network_type);
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        check_network(&self.target_address, network_type)
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            mosaic_id: ctx.mosaic_id(&self.mosaic_id)?,
            target_address: ctx.address(&self.target_address)?,
            ..*self
        })
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.target_address.refers_to(address, aliases)
    }

    fn has_aliases(&self) -> bool {
        self.mosaic_id.is_alias() || self.target_address.is_alias()
    }
}
