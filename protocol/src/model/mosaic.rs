//! Mosaics: ids, nonces, properties and amounts.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::hash::sha3_256_multi;
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::namespace::NAMESPACE_FLAG;
use crate::model::uint64::UInt64;
use crate::model::unresolved::UnresolvedMosaicId;

/// A canonical mosaic id. The high bit is always clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MosaicId(UInt64);

impl MosaicId {
    /// Wraps a raw id. Fails if the namespace bit is set.
    pub fn new(id: u64) -> Result<Self> {
        if id & NAMESPACE_FLAG != 0 {
            return Err(Error::invalid_argument(format!(
                "{:016X} has the namespace bit set and is not a mosaic id",
                id
            )));
        }
        Ok(Self(UInt64::new(id)))
    }

    /// Masks off the namespace bit instead of rejecting it.
    pub(crate) fn from_unflagged(id: u64) -> Self {
        Self(UInt64::new(id & !NAMESPACE_FLAG))
    }

    /// `SHA3-256(nonce LE || owner raw address)`, first eight bytes, high
    /// bit cleared.
    pub fn from_nonce(nonce: MosaicNonce, owner: &Address) -> Self {
        let digest = sha3_256_multi(&[&nonce.to_le_bytes(), owner.as_bytes()]);
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        Self(UInt64::new(u64::from_le_bytes(word) & !NAMESPACE_FLAG))
    }

    pub fn from_hex(input: &str) -> Result<Self> {
        Self::new(UInt64::from_hex(input)?.value())
    }

    pub fn id(self) -> UInt64 {
        self.0
    }

    pub fn value(self) -> u64 {
        self.0.value()
    }

    pub fn to_hex(self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for MosaicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Nonce mixed into mosaic id derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MosaicNonce(u32);

impl MosaicNonce {
    pub const fn new(nonce: u32) -> Self {
        Self(nonce)
    }

    pub fn random() -> Self {
        Self(rand::rngs::OsRng.next_u32())
    }

    /// Parses the 8-character hex of the little-endian nonce bytes.
    pub fn from_hex(input: &str) -> Result<Self> {
        let bytes = hex::decode(input)?;
        let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
            Error::invalid_argument(format!("mosaic nonce must be 4 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(u32::from_le_bytes(raw)))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub fn to_hex(self) -> String {
        hex::encode_upper(self.to_le_bytes())
    }
}

/// Mosaic property bits as carried in a definition transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicFlags {
    pub supply_mutable: bool,
    pub transferable: bool,
    pub restrictable: bool,
    pub revokable: bool,
}

impl MosaicFlags {
    const SUPPLY_MUTABLE: u8 = 0x01;
    const TRANSFERABLE: u8 = 0x02;
    const RESTRICTABLE: u8 = 0x04;
    const REVOKABLE: u8 = 0x08;

    pub fn new(supply_mutable: bool, transferable: bool, restrictable: bool, revokable: bool) -> Self {
        Self {
            supply_mutable,
            transferable,
            restrictable,
            revokable,
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut bits = 0;
        if self.supply_mutable {
            bits |= Self::SUPPLY_MUTABLE;
        }
        if self.transferable {
            bits |= Self::TRANSFERABLE;
        }
        if self.restrictable {
            bits |= Self::RESTRICTABLE;
        }
        if self.revokable {
            bits |= Self::REVOKABLE;
        }
        bits
    }

    /// Unknown high bits are ignored.
    pub fn from_byte(bits: u8) -> Self {
        Self {
            supply_mutable: bits & Self::SUPPLY_MUTABLE != 0,
            transferable: bits & Self::TRANSFERABLE != 0,
            restrictable: bits & Self::RESTRICTABLE != 0,
            revokable: bits & Self::REVOKABLE != 0,
        }
    }
}

/// An amount of a (possibly aliased) mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mosaic {
    pub id: UnresolvedMosaicId,
    pub amount: UInt64,
}

impl Mosaic {
    pub fn new(id: impl Into<UnresolvedMosaicId>, amount: impl Into<UInt64>) -> Self {
        Self {
            id: id.into(),
            amount: amount.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;
    use crate::model::namespace::NamespaceId;
    use crate::model::network::NetworkType;

    #[test]
    fn derived_ids_never_carry_namespace_bit() {
        let owner = Address::from_public_key(&KeyPair::generate().public_key(), NetworkType::TestNet);
        for _ in 0..32 {
            let id = MosaicId::from_nonce(MosaicNonce::random(), &owner);
            assert_eq!(id.value() & NAMESPACE_FLAG, 0);
        }
    }

    #[test]
    fn derivation_depends_on_nonce_and_owner() {
        let owner = Address::from_public_key(&KeyPair::generate().public_key(), NetworkType::TestNet);
        let other = Address::from_public_key(&KeyPair::generate().public_key(), NetworkType::TestNet);
        let a = MosaicId::from_nonce(MosaicNonce::new(1), &owner);
        assert_eq!(a, MosaicId::from_nonce(MosaicNonce::new(1), &owner));
        assert_ne!(a, MosaicId::from_nonce(MosaicNonce::new(2), &owner));
        assert_ne!(a, MosaicId::from_nonce(MosaicNonce::new(1), &other));
    }

    #[test]
    fn namespace_bit_rejected() {
        assert!(MosaicId::new(0x8000_0000_0000_0001).is_err());
        assert!(MosaicId::from_hex("6BED913FA20223F8").is_ok());
    }

    #[test]
    fn nonce_hex_is_little_endian() {
        let nonce = MosaicNonce::from_hex("01000000").unwrap();
        assert_eq!(nonce.value(), 1);
        assert_eq!(nonce.to_hex(), "01000000");
        assert!(MosaicNonce::from_hex("0100").is_err());
    }

    #[test]
    fn flag_bits() {
        let flags = MosaicFlags::new(true, false, true, true);
        assert_eq!(flags.to_byte(), 0x0D);
        assert_eq!(MosaicFlags::from_byte(0x0D), flags);
        assert_eq!(MosaicFlags::from_byte(0xF2), MosaicFlags::new(false, true, false, false));
    }

    #[test]
    fn mosaic_accepts_alias_or_id() {
        let alias = NamespaceId::from_name("symbol.xym").unwrap();
        let m = Mosaic::new(alias, 10u64);
        assert!(m.id.is_alias());
        let id = MosaicId::from_hex("6BED913FA20223F8").unwrap();
        assert!(!Mosaic::new(id, 1u64).id.is_alias());
    }
}
