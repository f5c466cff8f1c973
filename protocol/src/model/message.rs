//! # Transfer Messages
//!
//! The message bytes of a transfer start with a one-byte type tag:
//!
//! | tag    | variant                          | rest of payload                     |
//! |--------|----------------------------------|-------------------------------------|
//! | `0x00` | plain                            | UTF-8 text                          |
//! | `0x01` | encrypted                        | uppercase hex of `tag || iv || ct`  |
//! | `0xFE` | persistent harvesting delegation | marker tail, ephemeral key, ciphertext |
//!
//! Anything else is kept verbatim as [`Message::Raw`], so decoding a transfer
//! never fails because of an exotic message.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{
    AES_NONCE_LENGTH, AES_TAG_LENGTH, HARVESTING_DELEGATION_MARKER, MAX_MESSAGE_SIZE,
    PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH,
};
use crate::crypto::encryption::{self, EncryptionError};
use crate::crypto::keys::{KeyPair, PublicKey, SignSchema};
use crate::error::{Error, Result};
use crate::model::account::{Account, PublicAccount};

/// Wire tag of each message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    Plain = 0x00,
    Encrypted = 0x01,
    PersistentHarvestingDelegation = 0xFE,
}

impl MessageType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::Plain),
            0x01 => Some(Self::Encrypted),
            0xFE => Some(Self::PersistentHarvestingDelegation),
            _ => None,
        }
    }
}

/// A transfer message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Message {
    Plain(String),
    Encrypted(EncryptedMessage),
    PersistentHarvestingDelegation(PersistentHarvestingDelegationMessage),
    /// Bytes with an unknown or missing tag, kept as-is.
    Raw(Vec<u8>),
}

impl Message {
    /// A plain text message. Fails if the encoded form exceeds the limit.
    pub fn plain(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        check_size(1 + text.len())?;
        Ok(Self::Plain(text))
    }

    /// No message at all: zero bytes on the wire.
    pub fn empty() -> Self {
        Self::Raw(Vec::new())
    }

    pub fn message_type(&self) -> Option<MessageType> {
        match self {
            Self::Plain(_) => Some(MessageType::Plain),
            Self::Encrypted(_) => Some(MessageType::Encrypted),
            Self::PersistentHarvestingDelegation(_) => {
                Some(MessageType::PersistentHarvestingDelegation)
            }
            Self::Raw(_) => None,
        }
    }

    /// Encoded size in bytes, tag included.
    pub fn size(&self) -> usize {
        match self {
            Self::Plain(text) => 1 + text.len(),
            Self::Encrypted(m) => 1 + m.payload.len(),
            Self::PersistentHarvestingDelegation(m) => m.payload.len(),
            Self::Raw(bytes) => bytes.len(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        match self {
            Self::Plain(text) => {
                out.push(MessageType::Plain as u8);
                out.extend_from_slice(text.as_bytes());
            }
            Self::Encrypted(m) => {
                out.push(MessageType::Encrypted as u8);
                out.extend_from_slice(m.payload.as_bytes());
            }
            Self::PersistentHarvestingDelegation(m) => out.extend_from_slice(&m.payload),
            Self::Raw(bytes) => out.extend_from_slice(bytes),
        }
        out
    }

    /// Classifies message bytes by their tag.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let Some((&tag, rest)) = bytes.split_first() else {
            return Self::empty();
        };

        match MessageType::from_tag(tag) {
            Some(MessageType::Plain) => match std::str::from_utf8(rest) {
                Ok(text) => Self::Plain(text.to_string()),
                Err(_) => {
                    warn!(len = bytes.len(), "plain message is not UTF-8, keeping raw bytes");
                    Self::Raw(bytes.to_vec())
                }
            },
            Some(MessageType::Encrypted) => match EncryptedMessage::from_hex_payload(rest) {
                Some(m) => Self::Encrypted(m),
                None => {
                    warn!(len = bytes.len(), "encrypted message payload is not hex, keeping raw bytes");
                    Self::Raw(bytes.to_vec())
                }
            },
            Some(MessageType::PersistentHarvestingDelegation) => {
                match PersistentHarvestingDelegationMessage::from_payload(bytes) {
                    Ok(m) => Self::PersistentHarvestingDelegation(m),
                    Err(e) => {
                        warn!(error = %e, "malformed harvesting delegation message, keeping raw bytes");
                        Self::Raw(bytes.to_vec())
                    }
                }
            }
            None => {
                warn!(tag, len = bytes.len(), "unknown message tag, keeping raw bytes");
                Self::Raw(bytes.to_vec())
            }
        }
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::empty()
    }
}

fn check_size(size: usize) -> Result<()> {
    if size > MAX_MESSAGE_SIZE {
        return Err(Error::invalid_argument(format!(
            "message of {} bytes exceeds the {} byte limit",
            size, MAX_MESSAGE_SIZE
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// EncryptedMessage
// ---------------------------------------------------------------------------

/// An AES-GCM encrypted message between two accounts.
///
/// `payload` is the uppercase hex of `tag || iv || ciphertext` (catapult) or
/// `salt || tag || iv || ciphertext` (NIS1). The hex text itself is what goes
/// on the wire after the tag byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub payload: String,
}

impl EncryptedMessage {
    /// Encrypts `text` from `sender` to `recipient` under the sender's scheme.
    pub fn create(text: &str, recipient: &PublicAccount, sender: &Account) -> Result<Self> {
        let sealed = encryption::encrypt(
            sender.key_pair(),
            &recipient.public_key,
            sender.schema(),
            text.as_bytes(),
        )?;
        let payload = hex::encode_upper(sealed);
        check_size(1 + payload.len())?;
        Ok(Self { payload })
    }

    /// Decrypts as `recipient`, given the other party's public account.
    pub fn decrypt(&self, recipient: &Account, sender: &PublicAccount) -> Result<String> {
        let sealed = hex::decode(&self.payload)
            .map_err(|e| Error::invalid_format(format!("encrypted payload: {}", e)))?;
        let plain = encryption::decrypt(
            recipient.key_pair(),
            &sender.public_key,
            recipient.schema(),
            &sealed,
        )?;
        String::from_utf8(plain)
            .map_err(|_| Error::invalid_format("decrypted message is not UTF-8"))
    }

    fn from_hex_payload(rest: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(rest).ok()?;
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self {
            payload: text.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// PersistentHarvestingDelegationMessage
// ---------------------------------------------------------------------------

/// Decrypted content of a harvesting delegation request.
pub struct DelegatedHarvestingKeys {
    pub remote: KeyPair,
    pub vrf: KeyPair,
}

const DELEGATION_PLAINTEXT_LENGTH: usize = 2 * PRIVATE_KEY_LENGTH;
const DELEGATION_PAYLOAD_LENGTH: usize = HARVESTING_DELEGATION_MARKER.len()
    + PUBLIC_KEY_LENGTH
    + AES_TAG_LENGTH
    + AES_NONCE_LENGTH
    + DELEGATION_PLAINTEXT_LENGTH;

/// Asks a node to harvest with a remote key and a VRF key.
///
/// Layout: `marker(8) || ephemeral public key(32) || tag(16) || iv(12) ||
/// ciphertext(64)`. The marker's first byte doubles as the message tag. The
/// two private keys are encrypted to the node's public key with a one-time
/// ephemeral key pair, always under the catapult scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentHarvestingDelegationMessage {
    #[serde(with = "hex_bytes")]
    payload: Vec<u8>,
}

impl PersistentHarvestingDelegationMessage {
    pub fn create(
        remote_private_key: &KeyPair,
        vrf_private_key: &KeyPair,
        node_public_key: &PublicKey,
    ) -> Result<Self> {
        let ephemeral = KeyPair::generate();
        let mut plain = Vec::with_capacity(DELEGATION_PLAINTEXT_LENGTH);
        plain.extend_from_slice(&remote_private_key.private_key_bytes());
        plain.extend_from_slice(&vrf_private_key.private_key_bytes());
        let sealed = encryption::encrypt(&ephemeral, node_public_key, SignSchema::Catapult, &plain)?;

        let mut payload = Vec::with_capacity(DELEGATION_PAYLOAD_LENGTH);
        payload.extend_from_slice(&HARVESTING_DELEGATION_MARKER);
        payload.extend_from_slice(ephemeral.public_key().as_bytes());
        payload.extend_from_slice(&sealed);
        Ok(Self { payload })
    }

    /// Validates the marker and the minimum length of a raw payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        if !payload.starts_with(&HARVESTING_DELEGATION_MARKER) {
            return Err(Error::invalid_format("missing harvesting delegation marker"));
        }
        let min_len =
            HARVESTING_DELEGATION_MARKER.len() + PUBLIC_KEY_LENGTH + AES_TAG_LENGTH + AES_NONCE_LENGTH;
        if payload.len() < min_len {
            return Err(Error::invalid_format(format!(
                "harvesting delegation payload must be at least {} bytes, got {}",
                min_len,
                payload.len()
            )));
        }
        Ok(Self {
            payload: payload.to_vec(),
        })
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The one-time sender key embedded after the marker.
    pub fn ephemeral_public_key(&self) -> Result<PublicKey> {
        let start = HARVESTING_DELEGATION_MARKER.len();
        let key = self
            .payload
            .get(start..start + PUBLIC_KEY_LENGTH)
            .ok_or_else(|| Error::invalid_format("harvesting delegation payload is truncated"))?;
        Ok(PublicKey::try_from_slice(key)?)
    }

    /// Recovers the remote and VRF keys with the node's private key.
    ///
    /// Fails with [`Error::InvalidFormat`] unless exactly two keys come out.
    pub fn decrypt(&self, node: &KeyPair) -> Result<DelegatedHarvestingKeys> {
        let ephemeral = self.ephemeral_public_key()?;
        let sealed = self
            .payload
            .get(HARVESTING_DELEGATION_MARKER.len() + PUBLIC_KEY_LENGTH..)
            .unwrap_or_default();
        let plain = encryption::decrypt(node, &ephemeral, SignSchema::Catapult, sealed)?;
        if plain.len() != DELEGATION_PLAINTEXT_LENGTH {
            return Err(Error::invalid_format(
                EncryptionError::PlaintextLength {
                    expected: DELEGATION_PLAINTEXT_LENGTH,
                    got: plain.len(),
                }
                .to_string(),
            ));
        }

        let mut remote = [0u8; PRIVATE_KEY_LENGTH];
        let mut vrf = [0u8; PRIVATE_KEY_LENGTH];
        remote.copy_from_slice(&plain[..PRIVATE_KEY_LENGTH]);
        vrf.copy_from_slice(&plain[PRIVATE_KEY_LENGTH..]);
        Ok(DelegatedHarvestingKeys {
            remote: KeyPair::from_private_key(&remote),
            vrf: KeyPair::from_private_key(&vrf),
        })
    }
}

mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_upper(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encryption::encrypt_with_nonce;
    use crate::error::ErrorKind;
    use crate::model::network::NetworkType;

    #[test]
    fn plain_message_bytes() {
        let m = Message::plain("hi").unwrap();
        assert_eq!(m.to_bytes(), vec![0x00, b'h', b'i']);
        assert_eq!(m.size(), 3);
        assert_eq!(Message::from_bytes(&m.to_bytes()), m);
    }

    #[test]
    fn oversized_plain_message_rejected() {
        let err = Message::plain("x".repeat(MAX_MESSAGE_SIZE)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(Message::plain("x".repeat(MAX_MESSAGE_SIZE - 1)).is_ok());
    }

    #[test]
    fn empty_and_unknown_tags_are_raw() {
        assert_eq!(Message::from_bytes(&[]), Message::empty());
        assert!(Message::empty().to_bytes().is_empty());
        assert_eq!(Message::from_bytes(&[0x42, 1, 2]), Message::Raw(vec![0x42, 1, 2]));
        assert_eq!(Message::from_bytes(&[0x00, 0xFF]), Message::Raw(vec![0x00, 0xFF]));
    }

    #[test]
    fn encrypted_message_between_accounts() {
        let alice = Account::generate(NetworkType::TestNet);
        let bob = Account::generate(NetworkType::TestNet);
        let m = EncryptedMessage::create("secret", &bob.public_account(), &alice).unwrap();
        assert!(m.payload.bytes().all(|b| !b.is_ascii_lowercase()));

        let wire = Message::Encrypted(m.clone()).to_bytes();
        assert_eq!(wire[0], 0x01);
        let Message::Encrypted(decoded) = Message::from_bytes(&wire) else {
            panic!("expected encrypted message");
        };
        assert_eq!(decoded.decrypt(&bob, &alice.public_account()).unwrap(), "secret");
        assert_eq!(m.decrypt(&alice, &bob.public_account()).unwrap(), "secret");
    }

    #[test]
    fn nis1_accounts_interoperate_with_each_other() {
        let alice = Account::generate(NetworkType::TestNet).with_schema(SignSchema::Nis1);
        let bob = Account::generate(NetworkType::TestNet).with_schema(SignSchema::Nis1);
        let bob_public = PublicAccount::new(
            bob.key_pair().public_key_with_schema(SignSchema::Nis1),
            NetworkType::TestNet,
        );
        let alice_public = PublicAccount::new(
            alice.key_pair().public_key_with_schema(SignSchema::Nis1),
            NetworkType::TestNet,
        );
        let m = EncryptedMessage::create("legacy", &bob_public, &alice).unwrap();
        assert_eq!(m.decrypt(&bob, &alice_public).unwrap(), "legacy");
    }

    #[test]
    fn harvesting_delegation_roundtrip() {
        let remote = KeyPair::generate();
        let vrf = KeyPair::generate();
        let node = KeyPair::generate();
        let m = PersistentHarvestingDelegationMessage::create(&remote, &vrf, &node.public_key())
            .unwrap();
        assert_eq!(m.payload().len(), DELEGATION_PAYLOAD_LENGTH);
        assert_eq!(m.payload().len(), 132);

        let wire = Message::PersistentHarvestingDelegation(m).to_bytes();
        assert_eq!(&wire[..8], &HARVESTING_DELEGATION_MARKER);
        let Message::PersistentHarvestingDelegation(decoded) = Message::from_bytes(&wire) else {
            panic!("expected delegation message");
        };
        let keys = decoded.decrypt(&node).unwrap();
        assert_eq!(keys.remote, remote);
        assert_eq!(keys.vrf, vrf);
    }

    #[test]
    fn harvesting_delegation_with_wrong_plaintext_length_is_format_error() {
        let node = KeyPair::generate();
        let ephemeral = KeyPair::generate();
        let sealed = encrypt_with_nonce(
            &ephemeral,
            &node.public_key(),
            SignSchema::Catapult,
            &[7u8; 63],
            [1u8; AES_NONCE_LENGTH],
            [0u8; 32],
        )
        .unwrap();
        let mut payload = HARVESTING_DELEGATION_MARKER.to_vec();
        payload.extend_from_slice(ephemeral.public_key().as_bytes());
        payload.extend_from_slice(&sealed);

        let m = PersistentHarvestingDelegationMessage::from_payload(&payload).unwrap();
        let err = m.decrypt(&node).err().unwrap();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn harvesting_delegation_requires_marker() {
        assert!(PersistentHarvestingDelegationMessage::from_payload(&[0xFE; 132]).is_err());
        assert!(PersistentHarvestingDelegationMessage::from_payload(&HARVESTING_DELEGATION_MARKER).is_err());
        assert!(matches!(Message::from_bytes(&[0xFE, 0x00]), Message::Raw(_)));
    }
}
