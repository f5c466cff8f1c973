//! Namespace registration and alias bodies.

use crate::config::{TransactionLimits, ADDRESS_RAW_LENGTH};
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::mosaic::MosaicId;
use crate::model::namespace::{validate_part, NamespaceId};
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::transaction::body::BodyCodec;
use crate::transaction::codec::{Reader, Writer};
use crate::transaction::mosaic::read_mosaic_id;
use crate::transaction::types::{AliasAction, NamespaceRegistrationType};

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Root namespaces rent for a duration; sub-namespaces hang off a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceRegistration {
    Root { duration: UInt64 },
    Sub { parent_id: NamespaceId },
}

impl NamespaceRegistration {
    pub fn registration_type(&self) -> NamespaceRegistrationType {
        match self {
            Self::Root { .. } => NamespaceRegistrationType::RootNamespace,
            Self::Sub { .. } => NamespaceRegistrationType::SubNamespace,
        }
    }
}

/// ```text
/// duration | parent_id  u64
/// id                    u64
/// registration_type     u8
/// name_size             u8
/// name                  [u8; name_size]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRegistrationBody {
    pub registration: NamespaceRegistration,
    pub id: NamespaceId,
    pub name: String,
}

impl NamespaceRegistrationBody {
    pub fn root(name: &str, duration: impl Into<UInt64>) -> Result<Self> {
        Ok(Self {
            registration: NamespaceRegistration::Root {
                duration: duration.into(),
            },
            id: NamespaceId::child_of(NamespaceId::new(0), name)?,
            name: name.to_string(),
        })
    }

    pub fn sub(parent_id: NamespaceId, name: &str) -> Result<Self> {
        Ok(Self {
            registration: NamespaceRegistration::Sub { parent_id },
            id: NamespaceId::child_of(parent_id, name)?,
            name: name.to_string(),
        })
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let word = r.u64()?;
        let id = NamespaceId::new(r.u64()?);
        let registration = match NamespaceRegistrationType::try_from(r.u8()?)? {
            NamespaceRegistrationType::RootNamespace => NamespaceRegistration::Root {
                duration: UInt64::new(word),
            },
            NamespaceRegistrationType::SubNamespace => NamespaceRegistration::Sub {
                parent_id: NamespaceId::new(word),
            },
        };
        let name_size = r.u8()? as usize;
        let name = std::str::from_utf8(r.bytes(name_size)?)
            .map_err(|_| Error::invalid_format("namespace name is not UTF-8"))?
            .to_string();
        Ok(Self {
            registration,
            id,
            name,
        })
    }
}

impl BodyCodec for NamespaceRegistrationBody {
    fn size(&self) -> usize {
        8 + 8 + 1 + 1 + self.name.len()
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        match self.registration {
            NamespaceRegistration::Root { duration } => w.uint64(duration),
            NamespaceRegistration::Sub { parent_id } => w.u64(parent_id.value()),
        }
        w.u64(self.id.value());
        w.u8(self.registration.registration_type().value());
        w.u8(self.name.len() as u8);
        w.bytes(self.name.as_bytes());
    }

    fn validate(&self, _network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        validate_part(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// Links a namespace to an account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressAliasBody {
    pub namespace_id: NamespaceId,
    pub address: Address,
    pub action: AliasAction,
}

impl AddressAliasBody {
    pub fn new(action: AliasAction, namespace_id: NamespaceId, address: Address) -> Self {
        Self {
            namespace_id,
            address,
            action,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let namespace_id = NamespaceId::new(r.u64()?);
        let address = Address::from_raw_bytes(r.array::<ADDRESS_RAW_LENGTH>()?)
            .map_err(|e| Error::invalid_format(e.to_string()))?;
        Ok(Self {
            namespace_id,
            address,
            action: AliasAction::try_from(r.u8()?)?,
        })
    }
}

impl BodyCodec for AddressAliasBody {
    fn size(&self) -> usize {
        8 + ADDRESS_RAW_LENGTH + 1
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.u64(self.namespace_id.value());
        w.bytes(self.address.as_bytes());
        w.u8(self.action.value());
    }

    fn validate(&self, network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        if self.address.network_type() != network_type {
            return Err(Error::invalid_argument(format!(
                "alias target {} is not a {} address",
                self.address, network_type
            )));
        }
        Ok(())
    }

    fn notifies(&self, address: &Address, _aliases: &[NamespaceId]) -> bool {
        self.address == *address
    }
}

/// Links a namespace to a mosaic id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicAliasBody {
    pub namespace_id: NamespaceId,
    pub mosaic_id: MosaicId,
    pub action: AliasAction,
}

impl MosaicAliasBody {
    pub fn new(action: AliasAction, namespace_id: NamespaceId, mosaic_id: MosaicId) -> Self {
        Self {
            namespace_id,
            mosaic_id,
            action,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            namespace_id: NamespaceId::new(r.u64()?),
            mosaic_id: read_mosaic_id(r)?,
            action: AliasAction::try_from(r.u8()?)?,
        })
    }
}

impl BodyCodec for MosaicAliasBody {
    fn size(&self) -> usize {
        8 + 8 + 1
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.u64(self.namespace_id.value());
        w.u64(self.mosaic_id.value());
        w.u8(self.action.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::PublicKey;

    fn encode(body: &impl BodyCodec) -> Vec<u8> {
        let mut w = Writer::with_capacity(body.size());
        body.write(&mut w, NetworkType::TestNet);
        w.into_vec()
    }

    #[test]
    fn root_registration_layout() {
        let body = NamespaceRegistrationBody::root("nem", 1_000u64).unwrap();
        assert_eq!(body.id, NamespaceId::from_name("nem").unwrap());

        let bytes = encode(&body);
        assert_eq!(bytes.len(), body.size());
        assert_eq!(&bytes[..8], &1_000u64.to_le_bytes());
        assert_eq!(&bytes[16..18], &[0, 3]);
        assert_eq!(&bytes[18..], b"nem");
        assert_eq!(NamespaceRegistrationBody::read(&mut Reader::new(&bytes)).unwrap(), body);
    }

    #[test]
    fn sub_registration_matches_dotted_name() {
        let parent = NamespaceId::from_name("symbol").unwrap();
        let body = NamespaceRegistrationBody::sub(parent, "xym").unwrap();
        assert_eq!(body.id, NamespaceId::from_name("symbol.xym").unwrap());

        let bytes = encode(&body);
        assert_eq!(bytes[16], 1);
        let decoded = NamespaceRegistrationBody::read(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded.registration, NamespaceRegistration::Sub { parent_id: parent });
    }

    #[test]
    fn invalid_name_rejected() {
        assert!(NamespaceRegistrationBody::root("Bad Name", 1u64).is_err());
        assert!(NamespaceRegistrationBody::root("", 1u64).is_err());
    }

    #[test]
    fn address_alias_round_trip() {
        let address = Address::from_public_key(&PublicKey::from_bytes([6u8; 32]), NetworkType::TestNet);
        let body = AddressAliasBody::new(AliasAction::Link, NamespaceId::from_name("alice").unwrap(), address);
        let bytes = encode(&body);
        assert_eq!(bytes.len(), 33);
        assert_eq!(AddressAliasBody::read(&mut Reader::new(&bytes)).unwrap(), body);
        assert!(body.notifies(&address, &[]));
        assert!(body
            .validate(NetworkType::MainNet, &TransactionLimits::default())
            .is_err());
    }

    #[test]
    fn mosaic_alias_layout() {
        let body = MosaicAliasBody::new(
            AliasAction::Unlink,
            NamespaceId::new(0x85BB_EA6C_C462_B244),
            MosaicId::new(0x6BED_9132_7A8F_DB9B).unwrap(),
        );
        let bytes = encode(&body);
        assert_eq!(bytes.len(), 17);
        assert_eq!(bytes[16], 0);
        assert_eq!(MosaicAliasBody::read(&mut Reader::new(&bytes)).unwrap(), body);
    }
}
