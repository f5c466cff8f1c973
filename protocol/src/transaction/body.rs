//! The closed set of transaction bodies.
//!
//! Every wire type maps to one [`TransactionBody`] variant. Shared behavior
//! (size, encoding, validation, alias resolution, interested parties) is
//! defined once by [`BodyCodec`] and fanned out with the `dispatch!`
//! macros, so adding a variant is a compile error until every operation
//! handles it.

use crate::config::TransactionLimits;
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::unresolved::UnresolvedAddress;
use crate::receipt::resolver::ResolutionContext;
use crate::transaction::aggregate::{AggregateBody, AggregateKind};
use crate::transaction::codec::{Reader, Writer};
use crate::transaction::key_link::{KeyLinkBody, VotingKeyLinkBody};
use crate::transaction::lock::{HashLockBody, SecretLockBody, SecretProofBody};
use crate::transaction::metadata::{AccountMetadataBody, MosaicMetadataBody, NamespaceMetadataBody};
use crate::transaction::mosaic::{
    MosaicDefinitionBody, MosaicSupplyChangeBody, MosaicSupplyRevocationBody,
};
use crate::transaction::multisig::MultisigAccountModificationBody;
use crate::transaction::namespace::{AddressAliasBody, MosaicAliasBody, NamespaceRegistrationBody};
use crate::transaction::restriction::{
    AccountAddressRestrictionBody, AccountMosaicRestrictionBody, AccountOperationRestrictionBody,
    MosaicAddressRestrictionBody, MosaicGlobalRestrictionBody,
};
use crate::transaction::transfer::TransferBody;
use crate::transaction::types::TransactionType;

/// Operations every body implements.
pub trait BodyCodec: Sized + Clone {
    /// Encoded body length in bytes.
    fn size(&self) -> usize;

    fn write(&self, w: &mut Writer, network_type: NetworkType);

    /// Build-time checks: limits, network consistency, field ranges.
    fn validate(&self, _network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        Ok(())
    }

    /// Replaces alias fields with the values the block recorded.
    fn resolve(&self, _ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(self.clone())
    }

    /// `true` when `address` (or one of its `aliases`) is an interested
    /// party named by the body. The signer is checked by the caller.
    fn notifies(&self, _address: &Address, _aliases: &[NamespaceId]) -> bool {
        false
    }

    /// `true` when the body holds at least one unresolved alias.
    fn has_aliases(&self) -> bool {
        false
    }
}

/// Body of any supported transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionBody {
    Transfer(TransferBody),
    NamespaceRegistration(NamespaceRegistrationBody),
    AddressAlias(AddressAliasBody),
    MosaicAlias(MosaicAliasBody),
    MosaicDefinition(MosaicDefinitionBody),
    MosaicSupplyChange(MosaicSupplyChangeBody),
    MosaicSupplyRevocation(MosaicSupplyRevocationBody),
    MultisigAccountModification(MultisigAccountModificationBody),
    Aggregate(AggregateBody),
    HashLock(HashLockBody),
    SecretLock(SecretLockBody),
    SecretProof(SecretProofBody),
    AccountAddressRestriction(AccountAddressRestrictionBody),
    AccountMosaicRestriction(AccountMosaicRestrictionBody),
    AccountOperationRestriction(AccountOperationRestrictionBody),
    AccountKeyLink(KeyLinkBody),
    NodeKeyLink(KeyLinkBody),
    VrfKeyLink(KeyLinkBody),
    VotingKeyLink(VotingKeyLinkBody),
    AccountMetadata(AccountMetadataBody),
    MosaicMetadata(MosaicMetadataBody),
    NamespaceMetadata(NamespaceMetadataBody),
    MosaicGlobalRestriction(MosaicGlobalRestrictionBody),
    MosaicAddressRestriction(MosaicAddressRestrictionBody),
}

macro_rules! dispatch {
    ($value:expr, $b:ident => $e:expr) => {
        match $value {
            TransactionBody::Transfer($b) => $e,
            TransactionBody::NamespaceRegistration($b) => $e,
            TransactionBody::AddressAlias($b) => $e,
            TransactionBody::MosaicAlias($b) => $e,
            TransactionBody::MosaicDefinition($b) => $e,
            TransactionBody::MosaicSupplyChange($b) => $e,
            TransactionBody::MosaicSupplyRevocation($b) => $e,
            TransactionBody::MultisigAccountModification($b) => $e,
            TransactionBody::Aggregate($b) => $e,
            TransactionBody::HashLock($b) => $e,
            TransactionBody::SecretLock($b) => $e,
            TransactionBody::SecretProof($b) => $e,
            TransactionBody::AccountAddressRestriction($b) => $e,
            TransactionBody::AccountMosaicRestriction($b) => $e,
            TransactionBody::AccountOperationRestriction($b) => $e,
            TransactionBody::AccountKeyLink($b) => $e,
            TransactionBody::NodeKeyLink($b) => $e,
            TransactionBody::VrfKeyLink($b) => $e,
            TransactionBody::VotingKeyLink($b) => $e,
            TransactionBody::AccountMetadata($b) => $e,
            TransactionBody::MosaicMetadata($b) => $e,
            TransactionBody::NamespaceMetadata($b) => $e,
            TransactionBody::MosaicGlobalRestriction($b) => $e,
            TransactionBody::MosaicAddressRestriction($b) => $e,
        }
    };
}

/// Like `dispatch!`, but rewraps the result in the same variant.
macro_rules! dispatch_map {
    ($value:expr, $b:ident => $e:expr) => {
        match $value {
            TransactionBody::Transfer($b) => TransactionBody::Transfer($e),
            TransactionBody::NamespaceRegistration($b) => TransactionBody::NamespaceRegistration($e),
            TransactionBody::AddressAlias($b) => TransactionBody::AddressAlias($e),
            TransactionBody::MosaicAlias($b) => TransactionBody::MosaicAlias($e),
            TransactionBody::MosaicDefinition($b) => TransactionBody::MosaicDefinition($e),
            TransactionBody::MosaicSupplyChange($b) => TransactionBody::MosaicSupplyChange($e),
            TransactionBody::MosaicSupplyRevocation($b) => TransactionBody::MosaicSupplyRevocation($e),
            TransactionBody::MultisigAccountModification($b) => {
                TransactionBody::MultisigAccountModification($e)
            }
            TransactionBody::Aggregate($b) => TransactionBody::Aggregate($e),
            TransactionBody::HashLock($b) => TransactionBody::HashLock($e),
            TransactionBody::SecretLock($b) => TransactionBody::SecretLock($e),
            TransactionBody::SecretProof($b) => TransactionBody::SecretProof($e),
            TransactionBody::AccountAddressRestriction($b) => {
                TransactionBody::AccountAddressRestriction($e)
            }
            TransactionBody::AccountMosaicRestriction($b) => {
                TransactionBody::AccountMosaicRestriction($e)
            }
            TransactionBody::AccountOperationRestriction($b) => {
                TransactionBody::AccountOperationRestriction($e)
            }
            TransactionBody::AccountKeyLink($b) => TransactionBody::AccountKeyLink($e),
            TransactionBody::NodeKeyLink($b) => TransactionBody::NodeKeyLink($e),
            TransactionBody::VrfKeyLink($b) => TransactionBody::VrfKeyLink($e),
            TransactionBody::VotingKeyLink($b) => TransactionBody::VotingKeyLink($e),
            TransactionBody::AccountMetadata($b) => TransactionBody::AccountMetadata($e),
            TransactionBody::MosaicMetadata($b) => TransactionBody::MosaicMetadata($e),
            TransactionBody::NamespaceMetadata($b) => TransactionBody::NamespaceMetadata($e),
            TransactionBody::MosaicGlobalRestriction($b) => {
                TransactionBody::MosaicGlobalRestriction($e)
            }
            TransactionBody::MosaicAddressRestriction($b) => {
                TransactionBody::MosaicAddressRestriction($e)
            }
        }
    };
}

impl TransactionBody {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Transfer(_) => TransactionType::Transfer,
            Self::NamespaceRegistration(_) => TransactionType::NamespaceRegistration,
            Self::AddressAlias(_) => TransactionType::AddressAlias,
            Self::MosaicAlias(_) => TransactionType::MosaicAlias,
            Self::MosaicDefinition(_) => TransactionType::MosaicDefinition,
            Self::MosaicSupplyChange(_) => TransactionType::MosaicSupplyChange,
            Self::MosaicSupplyRevocation(_) => TransactionType::MosaicSupplyRevocation,
            Self::MultisigAccountModification(_) => TransactionType::MultisigAccountModification,
            Self::Aggregate(b) => b.kind.transaction_type(),
            Self::HashLock(_) => TransactionType::HashLock,
            Self::SecretLock(_) => TransactionType::SecretLock,
            Self::SecretProof(_) => TransactionType::SecretProof,
            Self::AccountAddressRestriction(_) => TransactionType::AccountAddressRestriction,
            Self::AccountMosaicRestriction(_) => TransactionType::AccountMosaicRestriction,
            Self::AccountOperationRestriction(_) => TransactionType::AccountOperationRestriction,
            Self::AccountKeyLink(_) => TransactionType::AccountKeyLink,
            Self::NodeKeyLink(_) => TransactionType::NodeKeyLink,
            Self::VrfKeyLink(_) => TransactionType::VrfKeyLink,
            Self::VotingKeyLink(_) => TransactionType::VotingKeyLink,
            Self::AccountMetadata(_) => TransactionType::AccountMetadata,
            Self::MosaicMetadata(_) => TransactionType::MosaicMetadata,
            Self::NamespaceMetadata(_) => TransactionType::NamespaceMetadata,
            Self::MosaicGlobalRestriction(_) => TransactionType::MosaicGlobalRestriction,
            Self::MosaicAddressRestriction(_) => TransactionType::MosaicAddressRestriction,
        }
    }

    /// Wire version. Only aggregates and voting key links have more than one.
    pub fn version(&self) -> u8 {
        match self {
            Self::Aggregate(b) => b.version,
            Self::VotingKeyLink(b) => b.linked_public_key.version(),
            _ => 1,
        }
    }

    pub fn size(&self) -> usize {
        dispatch!(self, b => b.size())
    }

    pub(crate) fn write(&self, w: &mut Writer, network_type: NetworkType) {
        dispatch!(self, b => b.write(w, network_type))
    }

    pub fn validate(&self, network_type: NetworkType, limits: &TransactionLimits) -> Result<()> {
        dispatch!(self, b => b.validate(network_type, limits))
    }

    pub fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(dispatch_map!(self, b => b.resolve(ctx)?))
    }

    pub fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        dispatch!(self, b => b.notifies(address, aliases))
    }

    pub fn has_aliases(&self) -> bool {
        dispatch!(self, b => b.has_aliases())
    }

    pub fn as_aggregate(&self) -> Option<&AggregateBody> {
        match self {
            Self::Aggregate(b) => Some(b),
            _ => None,
        }
    }

    /// Decodes a body, dispatching on `(type, version)`.
    pub(crate) fn read(
        transaction_type: TransactionType,
        version: u8,
        r: &mut Reader,
    ) -> Result<Self> {
        if !transaction_type.supported_versions().contains(&version) {
            return Err(Error::invalid_format(format!(
                "unsupported version {} for {}",
                version, transaction_type
            )));
        }

        Ok(match transaction_type {
            TransactionType::Transfer => Self::Transfer(TransferBody::read(r)?),
            TransactionType::NamespaceRegistration => {
                Self::NamespaceRegistration(NamespaceRegistrationBody::read(r)?)
            }
            TransactionType::AddressAlias => Self::AddressAlias(AddressAliasBody::read(r)?),
            TransactionType::MosaicAlias => Self::MosaicAlias(MosaicAliasBody::read(r)?),
            TransactionType::MosaicDefinition => {
                Self::MosaicDefinition(MosaicDefinitionBody::read(r)?)
            }
            TransactionType::MosaicSupplyChange => {
                Self::MosaicSupplyChange(MosaicSupplyChangeBody::read(r)?)
            }
            TransactionType::MosaicSupplyRevocation => {
                Self::MosaicSupplyRevocation(MosaicSupplyRevocationBody::read(r)?)
            }
            TransactionType::MultisigAccountModification => {
                Self::MultisigAccountModification(MultisigAccountModificationBody::read(r)?)
            }
            TransactionType::AggregateComplete => {
                Self::Aggregate(AggregateBody::read(r, AggregateKind::Complete, version)?)
            }
            TransactionType::AggregateBonded => {
                Self::Aggregate(AggregateBody::read(r, AggregateKind::Bonded, version)?)
            }
            TransactionType::HashLock => Self::HashLock(HashLockBody::read(r)?),
            TransactionType::SecretLock => Self::SecretLock(SecretLockBody::read(r)?),
            TransactionType::SecretProof => Self::SecretProof(SecretProofBody::read(r)?),
            TransactionType::AccountAddressRestriction => {
                Self::AccountAddressRestriction(AccountAddressRestrictionBody::read(r)?)
            }
            TransactionType::AccountMosaicRestriction => {
                Self::AccountMosaicRestriction(AccountMosaicRestrictionBody::read(r)?)
            }
            TransactionType::AccountOperationRestriction => {
                Self::AccountOperationRestriction(AccountOperationRestrictionBody::read(r)?)
            }
            TransactionType::AccountKeyLink => Self::AccountKeyLink(KeyLinkBody::read(r)?),
            TransactionType::NodeKeyLink => Self::NodeKeyLink(KeyLinkBody::read(r)?),
            TransactionType::VrfKeyLink => Self::VrfKeyLink(KeyLinkBody::read(r)?),
            TransactionType::VotingKeyLink => {
                Self::VotingKeyLink(VotingKeyLinkBody::read(r, version)?)
            }
            TransactionType::AccountMetadata => {
                Self::AccountMetadata(AccountMetadataBody::read(r)?)
            }
            TransactionType::MosaicMetadata => Self::MosaicMetadata(MosaicMetadataBody::read(r)?),
            TransactionType::NamespaceMetadata => {
                Self::NamespaceMetadata(NamespaceMetadataBody::read(r)?)
            }
            TransactionType::MosaicGlobalRestriction => {
                Self::MosaicGlobalRestriction(MosaicGlobalRestrictionBody::read(r)?)
            }
            TransactionType::MosaicAddressRestriction => {
                Self::MosaicAddressRestriction(MosaicAddressRestrictionBody::read(r)?)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Validation helpers shared by the body modules
// ---------------------------------------------------------------------------

/// A canonical address must belong to the transaction's network.
pub(crate) fn check_network(address: &UnresolvedAddress, network_type: NetworkType) -> Result<()> {
    if let Some(a) = address.as_address() {
        if a.network_type() != network_type {
            return Err(Error::invalid_argument(format!(
                "address {} belongs to {}, transaction targets {}",
                a,
                a.network_type(),
                network_type
            )));
        }
    }
    Ok(())
}

/// A list whose length travels in a single byte.
pub(crate) fn check_count(what: &str, len: usize) -> Result<()> {
    if len > u8::MAX as usize {
        return Err(Error::invalid_argument(format!(
            "{} holds {} entries, at most {} fit",
            what,
            len,
            u8::MAX
        )));
    }
    Ok(())
}

/// Reads `count` items with `item`.
pub(crate) fn read_list<'a, T>(
    r: &mut Reader<'a>,
    count: usize,
    mut item: impl FnMut(&mut Reader<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    (0..count).map(|_| item(r)).collect()
}
