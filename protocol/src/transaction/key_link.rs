//! Key links: account (remote harvesting), node, VRF and voting keys.
//!
//! The first three share one 33-byte body. Voting key links carry an epoch
//! range and exist in two incompatible versions: v1 with a 48-byte BLS key,
//! v2 with a 32-byte Ed25519 key.

use crate::config::{TransactionLimits, VOTING_KEY_V1_LENGTH};
use crate::crypto::keys::PublicKey;
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::transaction::body::BodyCodec;
use crate::transaction::codec::{Reader, Writer};
use crate::transaction::types::LinkAction;

/// `true` when `key` controls `address`.
fn key_owns(key: &PublicKey, address: &Address) -> bool {
    Address::from_public_key(key, address.network_type()) == *address
}

// ---------------------------------------------------------------------------
// Account / node / VRF
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLinkBody {
    pub linked_public_key: PublicKey,
    pub link_action: LinkAction,
}

impl KeyLinkBody {
    pub fn new(linked_public_key: PublicKey, link_action: LinkAction) -> Self {
        Self {
            linked_public_key,
            link_action,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            linked_public_key: r.public_key()?,
            link_action: LinkAction::try_from(r.u8()?)?,
        })
    }
}

impl BodyCodec for KeyLinkBody {
    fn size(&self) -> usize {
        32 + 1
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.bytes(self.linked_public_key.as_bytes());
        w.u8(self.link_action.value());
    }

    fn notifies(&self, address: &Address, _aliases: &[NamespaceId]) -> bool {
        key_owns(&self.linked_public_key, address)
    }
}

// ---------------------------------------------------------------------------
// Voting
// ---------------------------------------------------------------------------

/// Voting key; the variant decides the wire version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotingKey {
    V1([u8; VOTING_KEY_V1_LENGTH]),
    V2(PublicKey),
}

impl VotingKey {
    pub fn version(&self) -> u8 {
        match self {
            Self::V1(_) => 1,
            Self::V2(_) => 2,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::V1(bytes) => bytes,
            Self::V2(key) => key.as_bytes(),
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.as_bytes())
    }

    /// Parses a 64 (v2) or 96 (v1) character hex key.
    pub fn from_hex(input: &str) -> Result<Self> {
        let bytes = hex::decode(input)?;
        match bytes.len() {
            VOTING_KEY_V1_LENGTH => {
                let mut key = [0u8; VOTING_KEY_V1_LENGTH];
                key.copy_from_slice(&bytes);
                Ok(Self::V1(key))
            }
            _ => Ok(Self::V2(PublicKey::try_from_slice(&bytes)?)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingKeyLinkBody {
    pub linked_public_key: VotingKey,
    pub start_epoch: u32,
    pub end_epoch: u32,
    pub link_action: LinkAction,
}

impl VotingKeyLinkBody {
    pub fn new(linked_public_key: VotingKey, start_epoch: u32, end_epoch: u32, link_action: LinkAction) -> Self {
        Self {
            linked_public_key,
            start_epoch,
            end_epoch,
            link_action,
        }
    }

    pub(crate) fn read(r: &mut Reader, version: u8) -> Result<Self> {
        let linked_public_key = match version {
            1 => VotingKey::V1(r.array::<VOTING_KEY_V1_LENGTH>()?),
            _ => VotingKey::V2(r.public_key()?),
        };
        Ok(Self {
            linked_public_key,
            start_epoch: r.u32()?,
            end_epoch: r.u32()?,
            link_action: LinkAction::try_from(r.u8()?)?,
        })
    }
}

impl BodyCodec for VotingKeyLinkBody {
    fn size(&self) -> usize {
        self.linked_public_key.as_bytes().len() + 4 + 4 + 1
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.bytes(self.linked_public_key.as_bytes());
        w.u32(self.start_epoch);
        w.u32(self.end_epoch);
        w.u8(self.link_action.value());
    }

    fn validate(&self, _network_type: NetworkType, _limits: &TransactionLimits) -> Result<()> {
        if self.start_epoch > self.end_epoch {
            return Err(Error::invalid_argument(format!(
                "voting epoch range {}..{} is reversed",
                self.start_epoch, self.end_epoch
            )));
        }
        Ok(())
    }

    fn notifies(&self, address: &Address, _aliases: &[NamespaceId]) -> bool {
        match &self.linked_public_key {
            VotingKey::V2(key) => key_owns(key, address),
            VotingKey::V1(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(body: &impl BodyCodec) -> Vec<u8> {
        let mut w = Writer::with_capacity(body.size());
        body.write(&mut w, NetworkType::TestNet);
        w.into_vec()
    }

    #[test]
    fn key_link_layout() {
        let key = PublicKey::from_bytes([0xAB; 32]);
        let bytes = encode(&KeyLinkBody::new(key, LinkAction::Link));
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[32], 1);
        assert_eq!(
            KeyLinkBody::read(&mut Reader::new(&bytes)).unwrap(),
            KeyLinkBody::new(key, LinkAction::Link)
        );
    }

    #[test]
    fn voting_versions_differ_in_shape() {
        let v1 = VotingKeyLinkBody::new(VotingKey::V1([1; 48]), 1, 10, LinkAction::Link);
        let v2 = VotingKeyLinkBody::new(
            VotingKey::V2(PublicKey::from_bytes([2; 32])),
            1,
            10,
            LinkAction::Unlink,
        );
        assert_eq!(encode(&v1).len(), 57);
        assert_eq!(encode(&v2).len(), 41);
        assert_eq!(
            VotingKeyLinkBody::read(&mut Reader::new(&encode(&v1)), 1).unwrap(),
            v1
        );
        assert_eq!(
            VotingKeyLinkBody::read(&mut Reader::new(&encode(&v2)), 2).unwrap(),
            v2
        );
        // A v2 payload read as v1 runs out of bytes.
        assert!(VotingKeyLinkBody::read(&mut Reader::new(&encode(&v2)), 1).is_err());
    }

    #[test]
    fn reversed_epochs_rejected() {
        let body = VotingKeyLinkBody::new(VotingKey::V2(PublicKey::default()), 9, 3, LinkAction::Link);
        assert!(body
            .validate(NetworkType::TestNet, &TransactionLimits::default())
            .is_err());
    }

    #[test]
    fn linked_account_is_notified() {
        let key = PublicKey::from_bytes([0x11; 32]);
        let linked = Address::from_public_key(&key, NetworkType::TestNet);
        let other = Address::from_public_key(&PublicKey::from_bytes([0x12; 32]), NetworkType::TestNet);
        let body = KeyLinkBody::new(key, LinkAction::Link);
        assert!(body.notifies(&linked, &[]));
        assert!(!body.notifies(&other, &[]));
    }

    #[test]
    fn voting_key_hex_forms() {
        assert_eq!(VotingKey::from_hex(&"00".repeat(48)).unwrap().version(), 1);
        assert_eq!(VotingKey::from_hex(&"00".repeat(32)).unwrap().version(), 2);
        assert!(VotingKey::from_hex(&"00".repeat(40)).is_err());
    }
}
