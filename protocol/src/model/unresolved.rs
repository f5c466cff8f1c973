//! References that may point at a namespace alias instead of the real thing.
//!
//! Both forms share the canonical wire slot:
//!
//! - an unresolved address is 24 bytes; if bit 0 of the first byte is set,
//!   bytes 1..9 hold a namespace id (LE) and the rest is zero;
//! - an unresolved mosaic id is a u64; if bit 63 is set, it is a namespace id.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::config::ADDRESS_RAW_LENGTH;
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::mosaic::MosaicId;
use crate::model::namespace::{NamespaceId, NAMESPACE_FLAG};
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;

/// Flag in byte 0 of a 24-byte slot marking a namespace alias.
const ALIAS_ADDRESS_FLAG: u8 = 0x01;

/// An address, or a namespace linked to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnresolvedAddress {
    Address(Address),
    Alias(NamespaceId),
}

impl UnresolvedAddress {
    pub fn is_alias(&self) -> bool {
        matches!(self, Self::Alias(_))
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(address) => Some(address),
            Self::Alias(_) => None,
        }
    }

    pub fn as_alias(&self) -> Option<NamespaceId> {
        match self {
            Self::Alias(id) => Some(*id),
            Self::Address(_) => None,
        }
    }

    /// 24-byte wire form. Aliases need the network to fill byte 0.
    pub fn to_bytes(&self, network_type: NetworkType) -> [u8; ADDRESS_RAW_LENGTH] {
        match self {
            Self::Address(address) => *address.as_bytes(),
            Self::Alias(id) => {
                let mut raw = [0u8; ADDRESS_RAW_LENGTH];
                raw[0] = network_type.as_u8() | ALIAS_ADDRESS_FLAG;
                raw[1..9].copy_from_slice(&id.value().to_le_bytes());
                raw
            }
        }
    }

    pub fn from_bytes(raw: [u8; ADDRESS_RAW_LENGTH]) -> Result<Self> {
        if raw[0] & ALIAS_ADDRESS_FLAG != 0 {
            let mut word = [0u8; 8];
            word.copy_from_slice(&raw[1..9]);
            return Ok(Self::Alias(NamespaceId::new(u64::from_le_bytes(word))));
        }
        Address::from_raw_bytes(raw).map(Self::Address)
    }

    /// Parses either a base32 address or a 16-character namespace id hex.
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() == 16 {
            return NamespaceId::from_hex(input).map(Self::Alias);
        }
        Address::from_raw_address(input).map(Self::Address)
    }

    /// Hex of the wire form, as nodes report it in transaction DTOs.
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded)?;
        let raw: [u8; ADDRESS_RAW_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            Error::invalid_argument(format!(
                "unresolved address must be {} bytes, got {}",
                ADDRESS_RAW_LENGTH,
                bytes.len()
            ))
        })?;
        Self::from_bytes(raw)
    }

    /// `true` when this is the given canonical address.
    pub fn matches(&self, address: &Address) -> bool {
        self.as_address() == Some(address)
    }

    /// `true` when this is `address` itself or one of the namespaces known
    /// to be linked to it.
    pub fn refers_to(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        match self {
            Self::Address(a) => a == address,
            Self::Alias(id) => aliases.contains(id),
        }
    }
}

impl From<Address> for UnresolvedAddress {
    fn from(address: Address) -> Self {
        Self::Address(address)
    }
}

impl From<NamespaceId> for UnresolvedAddress {
    fn from(id: NamespaceId) -> Self {
        Self::Alias(id)
    }
}

impl fmt::Display for UnresolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{}", address),
            Self::Alias(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for UnresolvedAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnresolvedAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.len() {
            48 => Self::from_encoded(&s),
            _ => Self::parse(&s),
        }
        .map_err(de::Error::custom)
    }
}

/// A mosaic id, or a namespace linked to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnresolvedMosaicId {
    Mosaic(MosaicId),
    Alias(NamespaceId),
}

impl UnresolvedMosaicId {
    pub fn is_alias(&self) -> bool {
        matches!(self, Self::Alias(_))
    }

    pub fn as_mosaic_id(&self) -> Option<MosaicId> {
        match self {
            Self::Mosaic(id) => Some(*id),
            Self::Alias(_) => None,
        }
    }

    pub fn as_alias(&self) -> Option<NamespaceId> {
        match self {
            Self::Alias(id) => Some(*id),
            Self::Mosaic(_) => None,
        }
    }

    pub fn to_u64(&self) -> u64 {
        match self {
            Self::Mosaic(id) => id.value(),
            Self::Alias(id) => id.value(),
        }
    }

    /// Classifies a wire value by its high bit.
    pub fn from_u64(value: u64) -> Self {
        if value & NAMESPACE_FLAG != 0 {
            Self::Alias(NamespaceId::new(value))
        } else {
            Self::Mosaic(MosaicId::from_unflagged(value))
        }
    }

    pub fn from_hex(input: &str) -> Result<Self> {
        Ok(Self::from_u64(UInt64::from_hex(input)?.value()))
    }

    pub fn to_hex(&self) -> String {
        UInt64::new(self.to_u64()).to_hex()
    }
}

impl From<MosaicId> for UnresolvedMosaicId {
    fn from(id: MosaicId) -> Self {
        Self::Mosaic(id)
    }
}

impl From<NamespaceId> for UnresolvedMosaicId {
    fn from(id: NamespaceId) -> Self {
        Self::Alias(id)
    }
}

impl fmt::Display for UnresolvedMosaicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for UnresolvedMosaicId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for UnresolvedMosaicId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;

    #[test]
    fn alias_address_layout() {
        let id = NamespaceId::from_name("nem").unwrap();
        let raw = UnresolvedAddress::Alias(id).to_bytes(NetworkType::TestNet);
        assert_eq!(raw[0], 0x99);
        assert_eq!(&raw[1..9], &id.value().to_le_bytes());
        assert!(raw[9..].iter().all(|b| *b == 0));
        assert_eq!(UnresolvedAddress::from_bytes(raw).unwrap(), UnresolvedAddress::Alias(id));
    }

    #[test]
    fn canonical_address_passes_through() {
        let address = Address::from_public_key(&KeyPair::generate().public_key(), NetworkType::MainNet);
        let unresolved = UnresolvedAddress::from(address);
        let raw = unresolved.to_bytes(NetworkType::MainNet);
        assert_eq!(&raw, address.as_bytes());
        assert_eq!(UnresolvedAddress::from_bytes(raw).unwrap(), unresolved);
        assert!(unresolved.matches(&address));
    }

    #[test]
    fn refers_to_checks_aliases() {
        let address = Address::from_public_key(&KeyPair::generate().public_key(), NetworkType::TestNet);
        let alias = NamespaceId::from_name("alice").unwrap();
        assert!(UnresolvedAddress::from(address).refers_to(&address, &[]));
        assert!(!UnresolvedAddress::from(alias).refers_to(&address, &[]));
        assert!(UnresolvedAddress::from(alias).refers_to(&address, &[alias]));
    }

    #[test]
    fn parse_distinguishes_forms() {
        let address = Address::from_public_key(&KeyPair::generate().public_key(), NetworkType::TestNet);
        assert_eq!(
            UnresolvedAddress::parse(&address.plain()).unwrap(),
            UnresolvedAddress::Address(address)
        );
        assert!(UnresolvedAddress::parse("84B3552D375FFA4B").unwrap().is_alias());
    }

    #[test]
    fn mosaic_high_bit_classifies() {
        assert!(UnresolvedMosaicId::from_u64(0xE74B_99BA_41F4_AFEE).is_alias());
        let plain = UnresolvedMosaicId::from_u64(0x6BED_913F_A202_23F8);
        assert_eq!(plain.as_mosaic_id().unwrap().to_hex(), "6BED913FA20223F8");
        assert_eq!(plain.to_u64(), 0x6BED_913F_A202_23F8);
    }

    #[test]
    fn serde_uses_hex_for_mosaics() {
        let id = UnresolvedMosaicId::from_u64(0x6BED_913F_A202_23F8);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6BED913FA20223F8\"");
        assert_eq!(serde_json::from_str::<UnresolvedMosaicId>(&json).unwrap(), id);
    }
}
