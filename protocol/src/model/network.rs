//! Network identifiers.
//!
//! The network byte is the first byte of every raw address and appears in
//! every transaction header, so mixing two networks inside one transaction
//! is always a caller bug.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// Ledger network a transaction, address or payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum NetworkType {
    /// Public main network (`N...` addresses).
    MainNet = 0x68,
    /// Public test network (`T...` addresses).
    TestNet = 0x98,
    /// Private network (`M...` addresses).
    Mijin = 0x60,
    /// Private test network (`S...` addresses).
    MijinTest = 0x90,
    /// Private network (`P...` addresses).
    Private = 0x78,
    /// Private test network (`V...` addresses).
    PrivateTest = 0xA8,
}

impl NetworkType {
    pub const ALL: [NetworkType; 6] = [
        Self::MainNet,
        Self::TestNet,
        Self::Mijin,
        Self::MijinTest,
        Self::Private,
        Self::PrivateTest,
    ];

    /// Returns the wire byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the first character of base32 addresses on this network.
    pub fn address_prefix(self) -> char {
        match self {
            Self::MainNet => 'N',
            Self::TestNet => 'T',
            Self::Mijin => 'M',
            Self::MijinTest => 'S',
            Self::Private => 'P',
            Self::PrivateTest => 'V',
        }
    }
}

impl TryFrom<u8> for NetworkType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|n| n.as_u8() == value)
            .ok_or_else(|| Error::invalid_format(format!("unknown network type 0x{:02X}", value)))
    }
}

impl From<NetworkType> for u8 {
    fn from(value: NetworkType) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainNet => write!(f, "MAIN_NET"),
            Self::TestNet => write!(f, "TEST_NET"),
            Self::Mijin => write!(f, "MIJIN"),
            Self::MijinTest => write!(f, "MIJIN_TEST"),
            Self::Private => write!(f, "PRIVATE"),
            Self::PrivateTest => write!(f, "PRIVATE_TEST"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_roundtrip() {
        for n in NetworkType::ALL {
            assert_eq!(NetworkType::try_from(n.as_u8()).unwrap(), n);
        }
        assert!(NetworkType::try_from(0x00u8).is_err());
    }

    #[test]
    fn serde_uses_numeric_form() {
        assert_eq!(serde_json::to_string(&NetworkType::TestNet).unwrap(), "152");
        let n: NetworkType = serde_json::from_str("104").unwrap();
        assert_eq!(n, NetworkType::MainNet);
        assert!(serde_json::from_str::<NetworkType>("7").is_err());
    }
}
