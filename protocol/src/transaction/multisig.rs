//! Multisig account modification.
//!
//! ```text
//! min_removal_delta         i8
//! min_approval_delta        i8
//! address_additions_count   u8
//! address_deletions_count   u8
//! reserved                  u32
//! address_additions         [[u8; 24]; additions_count]
//! address_deletions         [[u8; 24]; deletions_count]
//! ```

use crate::config::TransactionLimits;
use crate::error::Result;
use crate::model::address::Address;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::unresolved::UnresolvedAddress;
use crate::receipt::resolver::ResolutionContext;
use crate::transaction::body::{check_count, check_network, read_list, BodyCodec};
use crate::transaction::codec::{Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigAccountModificationBody {
    pub min_removal_delta: i8,
    pub min_approval_delta: i8,
    pub address_additions: Vec<UnresolvedAddress>,
    pub address_deletions: Vec<UnresolvedAddress>,
}

impl MultisigAccountModificationBody {
    pub fn new(
        min_approval_delta: i8,
        min_removal_delta: i8,
        address_additions: Vec<UnresolvedAddress>,
        address_deletions: Vec<UnresolvedAddress>,
    ) -> Self {
        Self {
            min_removal_delta,
            min_approval_delta,
            address_additions,
            address_deletions,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let min_removal_delta = r.i8()?;
        let min_approval_delta = r.i8()?;
        let additions_count = r.u8()? as usize;
        let deletions_count = r.u8()? as usize;
        r.skip(4)?;
        Ok(Self {
            min_removal_delta,
            min_approval_delta,
            address_additions: read_list(r, additions_count, Reader::address)?,
            address_deletions: read_list(r, deletions_count, Reader::address)?,
        })
    }

    fn cosignatories(&self) -> impl Iterator<Item = &UnresolvedAddress> {
        self.address_additions.iter().chain(&self.address_deletions)
    }
}

impl BodyCodec for MultisigAccountModificationBody {
    fn size(&self) -> usize {
        1 + 1 + 1 + 1 + 4 + 24 * (self.address_additions.len() + self.address_deletions.len())
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        w.i8(self.min_removal_delta);
        w.i8(self.min_approval_delta);
        w.u8(self.address_additions.len() as u8);
        w.u8(self.address_deletions.len() as u8);
        w.u32(0);
        for address in self.cosignatories() {
            w.address(address, network_type);
        }
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        check_count("cosignatory additions", self.address_additions.len())?;
        check_count("cosignatory deletions", self.address_deletions.len())?;
        self.cosignatories()
            .try_for_each(|a| check_network(a, network_type))
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            address_additions: ctx.addresses(&self.address_additions)?,
            address_deletions: ctx.addresses(&self.address_deletions)?,
            ..self.clone()
        })
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.cosignatories().any(|a| a.refers_to(address, aliases))
    }

    fn has_aliases(&self) -> bool {
        self.cosignatories().any(UnresolvedAddress::is_alias)
    }
}
