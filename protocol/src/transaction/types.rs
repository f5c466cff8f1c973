//! Wire enums shared by transaction bodies.
//!
//! Every enum here travels as a fixed-width integer. Decoding an unknown
//! value is a format error, never a panic.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::Error;

/// Declares a `#[repr]` enum with lossless conversions to and from its wire
/// integer.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($repr)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn value(self) -> $repr {
                self as $repr
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = Error;

            fn try_from(value: $repr) -> Result<Self, Self::Error> {
                match value {
                    $(v if v == $value => Ok(Self::$variant),)+
                    other => Err(Error::invalid_format(format!(
                        concat!("unknown ", stringify!($name), " value {}"),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value as $repr
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.value().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <$repr>::deserialize(deserializer)?;
                Self::try_from(raw).map_err(de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

wire_enum! {
    /// The 16-bit type tag in every transaction header.
    TransactionType: u16 {
        Transfer = 0x4154,
        NamespaceRegistration = 0x414E,
        AddressAlias = 0x424E,
        MosaicAlias = 0x434E,
        MosaicDefinition = 0x414D,
        MosaicSupplyChange = 0x424D,
        MosaicSupplyRevocation = 0x434D,
        MultisigAccountModification = 0x4155,
        AggregateComplete = 0x4141,
        AggregateBonded = 0x4241,
        HashLock = 0x4148,
        SecretLock = 0x4152,
        SecretProof = 0x4252,
        AccountAddressRestriction = 0x4150,
        AccountMosaicRestriction = 0x4250,
        AccountOperationRestriction = 0x4350,
        AccountKeyLink = 0x414C,
        NodeKeyLink = 0x424C,
        VrfKeyLink = 0x4243,
        VotingKeyLink = 0x4143,
        AccountMetadata = 0x4144,
        MosaicMetadata = 0x4244,
        NamespaceMetadata = 0x4344,
        MosaicGlobalRestriction = 0x4151,
        MosaicAddressRestriction = 0x4251,
    }
}

impl TransactionType {
    pub fn is_aggregate(self) -> bool {
        matches!(self, Self::AggregateComplete | Self::AggregateBonded)
    }

    /// Versions this crate can encode and decode.
    pub fn supported_versions(self) -> &'static [u8] {
        match self {
            Self::AggregateComplete | Self::AggregateBonded | Self::VotingKeyLink => &[1, 2],
            _ => &[1],
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transfer => "TRANSFER",
            Self::NamespaceRegistration => "NAMESPACE_REGISTRATION",
            Self::AddressAlias => "ADDRESS_ALIAS",
            Self::MosaicAlias => "MOSAIC_ALIAS",
            Self::MosaicDefinition => "MOSAIC_DEFINITION",
            Self::MosaicSupplyChange => "MOSAIC_SUPPLY_CHANGE",
            Self::MosaicSupplyRevocation => "MOSAIC_SUPPLY_REVOCATION",
            Self::MultisigAccountModification => "MULTISIG_ACCOUNT_MODIFICATION",
            Self::AggregateComplete => "AGGREGATE_COMPLETE",
            Self::AggregateBonded => "AGGREGATE_BONDED",
            Self::HashLock => "HASH_LOCK",
            Self::SecretLock => "SECRET_LOCK",
            Self::SecretProof => "SECRET_PROOF",
            Self::AccountAddressRestriction => "ACCOUNT_ADDRESS_RESTRICTION",
            Self::AccountMosaicRestriction => "ACCOUNT_MOSAIC_RESTRICTION",
            Self::AccountOperationRestriction => "ACCOUNT_OPERATION_RESTRICTION",
            Self::AccountKeyLink => "ACCOUNT_KEY_LINK",
            Self::NodeKeyLink => "NODE_KEY_LINK",
            Self::VrfKeyLink => "VRF_KEY_LINK",
            Self::VotingKeyLink => "VOTING_KEY_LINK",
            Self::AccountMetadata => "ACCOUNT_METADATA",
            Self::MosaicMetadata => "MOSAIC_METADATA",
            Self::NamespaceMetadata => "NAMESPACE_METADATA",
            Self::MosaicGlobalRestriction => "MOSAIC_GLOBAL_RESTRICTION",
            Self::MosaicAddressRestriction => "MOSAIC_ADDRESS_RESTRICTION",
        };
        write!(f, "{}", name)
    }
}

// ---------------------------------------------------------------------------
// Body enums
// ---------------------------------------------------------------------------

wire_enum! {
    /// Link or unlink a key.
    LinkAction: u8 {
        Unlink = 0,
        Link = 1,
    }
}

wire_enum! {
    /// Link or unlink a namespace alias.
    AliasAction: u8 {
        Unlink = 0,
        Link = 1,
    }
}

wire_enum! {
    MosaicSupplyChangeAction: u8 {
        Decrease = 0,
        Increase = 1,
    }
}

wire_enum! {
    NamespaceRegistrationType: u8 {
        RootNamespace = 0,
        SubNamespace = 1,
    }
}

wire_enum! {
    /// Hash used to derive a secret lock's secret from its proof.
    LockHashAlgorithm: u8 {
        /// SHA3-256.
        Sha3_256 = 0,
        /// RIPEMD-160 of SHA-256, left-aligned in the 32-byte secret.
        Hash160 = 1,
        /// Double SHA-256.
        Hash256 = 2,
    }
}

wire_enum! {
    /// Comparison applied by a mosaic global restriction.
    MosaicRestrictionType: u8 {
        None = 0,
        Eq = 1,
        Ne = 2,
        Lt = 3,
        Le = 4,
        Gt = 5,
        Ge = 6,
    }
}

wire_enum! {
    /// Flags of an account address restriction.
    AddressRestrictionFlag: u16 {
        AllowIncomingAddress = 0x0001,
        BlockIncomingAddress = 0x8001,
        AllowOutgoingAddress = 0x4001,
        BlockOutgoingAddress = 0xC001,
    }
}

wire_enum! {
    /// Flags of an account mosaic restriction.
    MosaicRestrictionFlag: u16 {
        AllowMosaic = 0x0002,
        BlockMosaic = 0x8002,
    }
}

wire_enum! {
    /// Flags of an account operation restriction.
    OperationRestrictionFlag: u16 {
        AllowIncomingTransactionType = 0x0004,
        AllowOutgoingTransactionType = 0x4004,
        BlockIncomingTransactionType = 0x8004,
        BlockOutgoingTransactionType = 0xC004,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_tags() {
        assert_eq!(TransactionType::Transfer.value(), 0x4154);
        assert_eq!(TransactionType::try_from(0x4241u16).unwrap(), TransactionType::AggregateBonded);
        assert_eq!(TransactionType::ALL.len(), 25);
        assert!(TransactionType::try_from(0x0000u16).is_err());
    }

    #[test]
    fn transaction_type_display() {
        assert_eq!(TransactionType::AccountKeyLink.to_string(), "ACCOUNT_KEY_LINK");
        assert_eq!(TransactionType::VrfKeyLink.to_string(), "VRF_KEY_LINK");
    }

    #[test]
    fn unknown_values_are_format_errors() {
        let err = LinkAction::try_from(7u8).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
        assert!(MosaicRestrictionType::try_from(7u8).is_err());
        assert!(AddressRestrictionFlag::try_from(0x0002u16).is_err());
    }

    #[test]
    fn restriction_flags() {
        assert_eq!(AddressRestrictionFlag::BlockOutgoingAddress.value(), 0xC001);
        assert_eq!(
            OperationRestrictionFlag::try_from(0x8004u16).unwrap(),
            OperationRestrictionFlag::BlockIncomingTransactionType
        );
    }

    #[test]
    fn serde_uses_wire_values() {
        assert_eq!(serde_json::to_string(&TransactionType::Transfer).unwrap(), "16724");
        let action: LinkAction = serde_json::from_str("1").unwrap();
        assert_eq!(action, LinkAction::Link);
    }
}
