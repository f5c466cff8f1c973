//! # Key Management
//!
//! Ed25519 key pairs, public keys and signatures for ledger accounts.
//!
//! Signing always follows the catapult convention: standard Ed25519 with a
//! SHA-512 key expansion, which is exactly what `ed25519-dalek` implements.
//!
//! Two key-expansion schemes exist for message encryption, though. The
//! catapult scheme expands the 32-byte seed with SHA-512; the legacy NIS1
//! scheme uses Keccak-512. The same seed therefore yields two different
//! public keys, and a shared secret only agrees when both sides use the
//! same scheme. The scheme is always passed explicitly as a [`SignSchema`].
//!
//! Key bytes are never logged and never appear in `Debug` output.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};
use sha3::Keccak512;
use std::fmt;
use thiserror::Error;

use crate::config::{PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid private key: expected {PRIVATE_KEY_LENGTH} hex-encoded bytes")]
    InvalidPrivateKey,

    #[error("invalid public key: expected {PUBLIC_KEY_LENGTH} bytes on the curve")]
    InvalidPublicKey,

    #[error("invalid signature: expected {SIGNATURE_LENGTH} bytes")]
    InvalidSignature,
}

/// Key-expansion and key-derivation convention of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignSchema {
    /// SHA-512 key expansion, HKDF-SHA256 message keys.
    #[default]
    Catapult,
    /// Keccak-512 key expansion, salted Keccak-256 message keys.
    Nis1,
}

/// An account key pair.
///
/// Deliberately not `Serialize`: exporting a private key should be an
/// explicit call to [`KeyPair::private_key_bytes`], never a side effect of
/// putting a struct in a JSON response.
pub struct KeyPair {
    signing_key: SigningKey,
}

/// A 32-byte public key.
///
/// Linked keys (VRF, node, remote) are arbitrary 32-byte values, so
/// construction only checks the length. Use [`PublicKey::to_verifying_key`]
/// when the bytes must be a valid curve point.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

impl KeyPair {
    /// Generates a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Builds a key pair from a 32-byte private key (seed).
    pub fn from_private_key(seed: &[u8; PRIVATE_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Builds a key pair from a hex-encoded private key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidPrivateKey)?;
        let seed: [u8; PRIVATE_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_private_key(&seed))
    }

    /// The catapult public key (the one that signs transactions).
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The public key under the given scheme.
    ///
    /// For [`SignSchema::Catapult`] this equals [`KeyPair::public_key`].
    pub fn public_key_with_schema(&self, schema: SignSchema) -> PublicKey {
        match schema {
            SignSchema::Catapult => self.public_key(),
            SignSchema::Nis1 => {
                let scalar = self.expanded_scalar(schema);
                PublicKey(EdwardsPoint::mul_base_clamped(scalar).compress().to_bytes())
            }
        }
    }

    /// Signs `message` with Ed25519.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Verifies a signature against this key pair's public key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Exports the raw private key. Handle with care.
    pub fn private_key_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// Derives the 32-byte Diffie-Hellman shared secret with `peer`.
    ///
    /// Multiplies the peer's Edwards point by this key's clamped, expanded
    /// scalar. The clamp clears the cofactor, so small-order components of
    /// a malicious peer key cannot leak scalar bits.
    pub fn shared_secret(
        &self,
        peer: &PublicKey,
        schema: SignSchema,
    ) -> Result<[u8; 32], KeyError> {
        let point = CompressedEdwardsY(peer.0)
            .decompress()
            .ok_or(KeyError::InvalidPublicKey)?;
        let scalar = self.expanded_scalar(schema);
        Ok(point.mul_clamped(scalar).compress().to_bytes())
    }

    /// First half of the scheme's 64-byte expansion of the seed (unclamped).
    fn expanded_scalar(&self, schema: SignSchema) -> [u8; 32] {
        let seed = self.signing_key.to_bytes();
        let mut scalar = [0u8; 32];
        match schema {
            SignSchema::Catapult => scalar.copy_from_slice(&Sha512::digest(seed)[..32]),
            SignSchema::Nis1 => scalar.copy_from_slice(&Keccak512::digest(seed)[..32]),
        }
        scalar
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_private_key(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair(pub={})", self.public_key())
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for KeyPair {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        slice
            .try_into()
            .map(Self)
            .map_err(|_| KeyError::InvalidPublicKey)
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// An all-zero key is the wire encoding of "no signer".
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; PUBLIC_KEY_LENGTH]
    }

    /// Uppercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    pub fn to_verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_bytes(&self.0).map_err(|_| KeyError::InvalidPublicKey)
    }

    /// Verifies an Ed25519 signature. Invalid keys simply fail to verify.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = self.to_verifying_key() else {
            return false;
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&signature.0))
            .is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        slice
            .try_into()
            .map(Self)
            .map_err(|_| KeyError::InvalidSignature)
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidSignature)?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// An all-zero signature is the wire encoding of "unsigned".
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; SIGNATURE_LENGTH]
    }

    /// Uppercase hex, 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}
