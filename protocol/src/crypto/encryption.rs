//! # Message Encryption
//!
//! Authenticated encryption of transfer messages between two accounts.
//!
//! A message key is agreed from (sender private key, recipient public key)
//! via [`KeyPair::shared_secret`], then expanded into an AES-256 key by the
//! account's [`SignSchema`]:
//!
//! - **Catapult**: HKDF-SHA256 over the shared secret, 32 zero bytes of
//!   salt, info `"catapult"`.
//! - **NIS1**: Keccak-256 of the shared secret XOR a random 32-byte salt
//!   that travels in front of the ciphertext.
//!
//! The cipher is AES-256-GCM with a 96-bit IV. GCM is unforgiving about
//! nonce reuse, so IVs come from the OS RNG unless a caller supplies one
//! (test vectors only).
//!
//! ## Wire format
//!
//! ```text
//! catapult: tag(16) || iv(12) || ciphertext
//! nis1:     salt(32) || tag(16) || iv(12) || ciphertext
//! ```
//!
//! The tag is placed in front, matching the ledger's encrypted message
//! layout, even though `aes-gcm` appends it.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

use super::hash::keccak_256;
use super::keys::{KeyPair, PublicKey, SignSchema};
use crate::config::{
    AES_KEY_LENGTH, AES_NONCE_LENGTH, AES_TAG_LENGTH, HKDF_INFO_CATAPULT, NIS1_SALT_LENGTH,
};

/// Errors that can occur during encryption/decryption.
///
/// Deliberately vague about why decryption failed: wrong key and tampered
/// ciphertext look the same from the outside.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("ciphertext too short: expected at least {expected} bytes, got {got}")]
    CiphertextTooShort { expected: usize, got: usize },

    #[error("key agreement failed: peer public key is not a curve point")]
    InvalidPeerKey,

    #[error("unexpected plaintext length: expected {expected} bytes, got {got}")]
    PlaintextLength { expected: usize, got: usize },
}

/// Encrypts `plaintext` from `sender` to `recipient` with a random IV.
pub fn encrypt(
    sender: &KeyPair,
    recipient: &PublicKey,
    schema: SignSchema,
    plaintext: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let mut iv = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    let mut salt = [0u8; NIS1_SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    encrypt_with_nonce(sender, recipient, schema, plaintext, iv, salt)
}

/// Encrypts with caller-supplied IV and salt (salt is ignored by the
/// catapult scheme). Never reuse an IV with the same key pair.
pub fn encrypt_with_nonce(
    sender: &KeyPair,
    recipient: &PublicKey,
    schema: SignSchema,
    plaintext: &[u8],
    iv: [u8; AES_NONCE_LENGTH],
    salt: [u8; NIS1_SALT_LENGTH],
) -> Result<Vec<u8>, EncryptionError> {
    let shared = sender
        .shared_secret(recipient, schema)
        .map_err(|_| EncryptionError::InvalidPeerKey)?;
    let key = derive_key(&shared, schema, &salt)?;

    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| EncryptionError::EncryptFailed)?;
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let tag = sealed.split_off(sealed.len() - AES_TAG_LENGTH);
    let mut out = Vec::with_capacity(NIS1_SALT_LENGTH + AES_TAG_LENGTH + AES_NONCE_LENGTH + sealed.len());
    if schema == SignSchema::Nis1 {
        out.extend_from_slice(&salt);
    }
    out.extend_from_slice(&tag);
    out.extend_from_slice(&iv);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypts data produced by [`encrypt`], as seen by `recipient`.
pub fn decrypt(
    recipient: &KeyPair,
    sender: &PublicKey,
    schema: SignSchema,
    data: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let prefix = match schema {
        SignSchema::Catapult => 0,
        SignSchema::Nis1 => NIS1_SALT_LENGTH,
    };
    let min_len = prefix + AES_TAG_LENGTH + AES_NONCE_LENGTH;
    if data.len() < min_len {
        return Err(EncryptionError::CiphertextTooShort {
            expected: min_len,
            got: data.len(),
        });
    }

    let mut salt = [0u8; NIS1_SALT_LENGTH];
    salt[..prefix].copy_from_slice(&data[..prefix]);
    let (tag, rest) = data[prefix..].split_at(AES_TAG_LENGTH);
    let (iv, ciphertext) = rest.split_at(AES_NONCE_LENGTH);

    let shared = recipient
        .shared_secret(sender, schema)
        .map_err(|_| EncryptionError::InvalidPeerKey)?;
    let key = derive_key(&shared, schema, &salt)?;

    let mut sealed = Vec::with_capacity(ciphertext.len() + AES_TAG_LENGTH);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| EncryptionError::DecryptFailed)?;
    cipher
        .decrypt(Nonce::from_slice(iv), sealed.as_slice())
        .map_err(|_| EncryptionError::DecryptFailed)
}

fn derive_key(
    shared: &[u8; 32],
    schema: SignSchema,
    salt: &[u8; NIS1_SALT_LENGTH],
) -> Result<[u8; AES_KEY_LENGTH], EncryptionError> {
    match schema {
        SignSchema::Catapult => {
            let hk = Hkdf::<Sha256>::new(Some(&[0u8; 32]), shared);
            let mut key = [0u8; AES_KEY_LENGTH];
            hk.expand(HKDF_INFO_CATAPULT, &mut key)
                .map_err(|_| EncryptionError::EncryptFailed)?;
            Ok(key)
        }
        SignSchema::Nis1 => {
            let mut mixed = *shared;
            for (byte, s) in mixed.iter_mut().zip(salt.iter()) {
                *byte ^= s;
            }
            Ok(keccak_256(&mixed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (KeyPair, KeyPair) {
        (KeyPair::generate(), KeyPair::generate())
    }

    #[test]
    fn catapult_roundtrip() {
        let (alice, bob) = pair();
        let sealed = encrypt(&alice, &bob.public_key(), SignSchema::Catapult, b"hello bob").unwrap();
        assert_eq!(sealed.len(), AES_TAG_LENGTH + AES_NONCE_LENGTH + 9);
        let plain = decrypt(&bob, &alice.public_key(), SignSchema::Catapult, &sealed).unwrap();
        assert_eq!(plain, b"hello bob");
    }

    #[test]
    fn nis1_roundtrip() {
        let (alice, bob) = pair();
        let schema = SignSchema::Nis1;
        let sealed = encrypt(&alice, &bob.public_key_with_schema(schema), schema, b"legacy").unwrap();
        assert_eq!(sealed.len(), NIS1_SALT_LENGTH + AES_TAG_LENGTH + AES_NONCE_LENGTH + 6);
        let plain = decrypt(&bob, &alice.public_key_with_schema(schema), schema, &sealed).unwrap();
        assert_eq!(plain, b"legacy");
    }

    #[test]
    fn schemas_are_not_interchangeable() {
        let (alice, bob) = pair();
        let sealed = encrypt(&alice, &bob.public_key(), SignSchema::Catapult, b"x").unwrap();
        let mut padded = vec![0u8; NIS1_SALT_LENGTH];
        padded.extend_from_slice(&sealed);
        assert!(decrypt(&bob, &alice.public_key(), SignSchema::Nis1, &padded).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let (alice, bob) = pair();
        let mut sealed = encrypt(&alice, &bob.public_key(), SignSchema::Catapult, b"secret").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;
        assert!(matches!(
            decrypt(&bob, &alice.public_key(), SignSchema::Catapult, &sealed),
            Err(EncryptionError::DecryptFailed)
        ));
    }

    #[test]
    fn wrong_recipient_fails() {
        let (alice, bob) = pair();
        let eve = KeyPair::generate();
        let sealed = encrypt(&alice, &bob.public_key(), SignSchema::Catapult, b"secret").unwrap();
        assert!(decrypt(&eve, &alice.public_key(), SignSchema::Catapult, &sealed).is_err());
    }

    #[test]
    fn fixed_nonce_is_deterministic() {
        let (alice, bob) = pair();
        let iv = [7u8; AES_NONCE_LENGTH];
        let a = encrypt_with_nonce(&alice, &bob.public_key(), SignSchema::Catapult, b"m", iv, [0; 32]).unwrap();
        let b = encrypt_with_nonce(&alice, &bob.public_key(), SignSchema::Catapult, b"m", iv, [1; 32]).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[AES_TAG_LENGTH..AES_TAG_LENGTH + AES_NONCE_LENGTH], &iv);
    }

    #[test]
    fn too_short_is_rejected() {
        let (alice, bob) = pair();
        assert!(matches!(
            decrypt(&bob, &alice.public_key(), SignSchema::Catapult, &[0u8; 10]),
            Err(EncryptionError::CiphertextTooShort { .. })
        ));
    }
}
