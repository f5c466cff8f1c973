//! # Account Addresses
//!
//! An address is derived from an account's public key:
//!
//! ```text
//! public_key (32 bytes)
//!     -> SHA3-256 -> RIPEMD-160 (20 bytes)
//!     -> network byte || digest (21 bytes)
//!     -> || SHA3-256(first 21 bytes)[..3]   (checksum)
//!     => 24 raw bytes
//! ```
//!
//! The human form is the RFC 4648 base32 encoding of the 24 raw bytes
//! followed by a zero byte, with the final character dropped: 39 characters
//! starting with the network's prefix letter (`N`, `T`, ...). The pretty
//! form inserts a dash every six characters.

use data_encoding::BASE32;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::config::{ADDRESS_CHECKSUM_LENGTH, ADDRESS_ENCODED_LENGTH, ADDRESS_RAW_LENGTH};
use crate::crypto::hash::{ripemd160, sha3_256};
use crate::crypto::keys::PublicKey;
use crate::error::{Error, Result};
use crate::model::network::NetworkType;

/// A canonical (non-alias) account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    raw: [u8; ADDRESS_RAW_LENGTH],
    network_type: NetworkType,
}

impl Address {
    /// Derives the address of `public_key` on `network_type`.
    pub fn from_public_key(public_key: &PublicKey, network_type: NetworkType) -> Self {
        let digest = ripemd160(&sha3_256(public_key.as_bytes()));

        let mut raw = [0u8; ADDRESS_RAW_LENGTH];
        raw[0] = network_type.as_u8();
        raw[1..21].copy_from_slice(&digest);
        let checksum = sha3_256(&raw[..21]);
        raw[21..].copy_from_slice(&checksum[..ADDRESS_CHECKSUM_LENGTH]);

        Self { raw, network_type }
    }

    /// Parses a base32 address, plain or pretty (dashed).
    pub fn from_raw_address(address: &str) -> Result<Self> {
        let plain: String = address
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if plain.len() != ADDRESS_ENCODED_LENGTH {
            return Err(Error::invalid_argument(format!(
                "address '{}' must have {} characters, got {}",
                address,
                ADDRESS_ENCODED_LENGTH,
                plain.len()
            )));
        }

        let decoded = BASE32
            .decode(format!("{}A", plain).as_bytes())
            .map_err(|e| Error::invalid_argument(format!("address '{}': {}", address, e)))?;
        let mut raw = [0u8; ADDRESS_RAW_LENGTH];
        raw.copy_from_slice(&decoded[..ADDRESS_RAW_LENGTH]);
        Self::from_raw_bytes(raw).map_err(|e| Error::invalid_argument(e.to_string()))
    }

    /// Parses the 48-character hex form of the raw bytes.
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded)?;
        let raw: [u8; ADDRESS_RAW_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            Error::invalid_argument(format!(
                "encoded address must be {} bytes, got {}",
                ADDRESS_RAW_LENGTH,
                bytes.len()
            ))
        })?;
        Self::from_raw_bytes(raw)
    }

    /// Validates network byte and checksum of 24 raw bytes.
    ///
    /// Fails with [`Error::InvalidFormat`] since raw bytes normally come off
    /// the wire.
    pub fn from_raw_bytes(raw: [u8; ADDRESS_RAW_LENGTH]) -> Result<Self> {
        let network_type = NetworkType::try_from(raw[0])?;
        let checksum = sha3_256(&raw[..21]);
        if raw[21..] != checksum[..ADDRESS_CHECKSUM_LENGTH] {
            return Err(Error::invalid_format(format!(
                "address checksum mismatch for {}",
                hex::encode_upper(raw)
            )));
        }
        Ok(Self { raw, network_type })
    }

    /// `true` when `address` parses as a valid base32 address.
    pub fn is_valid_raw_address(address: &str) -> bool {
        Self::from_raw_address(address).is_ok()
    }

    /// `true` when `encoded` parses as a valid hex address.
    pub fn is_valid_encoded_address(encoded: &str) -> bool {
        Self::from_encoded(encoded).is_ok()
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_RAW_LENGTH] {
        &self.raw
    }

    /// 39-character base32 form.
    pub fn plain(&self) -> String {
        let mut padded = [0u8; ADDRESS_RAW_LENGTH + 1];
        padded[..ADDRESS_RAW_LENGTH].copy_from_slice(&self.raw);
        let mut encoded = BASE32.encode(&padded);
        encoded.truncate(ADDRESS_ENCODED_LENGTH);
        encoded
    }

    /// Base32 form split into dash-separated groups of six.
    pub fn pretty(&self) -> String {
        let plain = self.plain();
        plain
            .as_bytes()
            .chunks(6)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// 48-character uppercase hex of the raw bytes.
    pub fn encoded(&self) -> String {
        hex::encode_upper(self.raw)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plain())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.plain())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.plain())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_raw_address(&s).map_err(de::Error::custom)
    }
}
