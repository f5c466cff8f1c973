//! # Hashing Utilities
//!
//! The hash functions the ledger's wire format depends on:
//!
//! - **SHA3-256**: transaction hashes, address derivation, namespace and
//!   mosaic id generation, merkle roots of aggregate bodies.
//! - **Keccak-256 / Keccak-512**: the NIS1 key-derivation scheme.
//! - **SHA-256 / RIPEMD-160**: address key hashing and the HASH_160 /
//!   HASH_256 secret lock algorithms.
//!
//! Everything returns fixed-size arrays; callers that want a `Vec` can
//! `to_vec()` it themselves.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use sha3::{Keccak256, Sha3_256};

/// SHA3-256 of `data`.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    Sha3_256::digest(data).into()
}

/// SHA3-256 over the concatenation of `parts`, without allocating it.
pub fn sha3_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Keccak-256 (pre-standard SHA3 padding) of `data`.
pub fn keccak_256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// `RIPEMD-160(SHA-256(data))`.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Merkle root over `leaves` using SHA3-256.
///
/// An empty tree hashes to 32 zero bytes; a single leaf is its own root.
/// On odd levels the last hash is paired with itself.
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<[u8; 32]> = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).unwrap_or(&pair[0]);
                sha3_256_multi(&[&pair[0], right])
            })
            .collect();
    }
    level[0]
}
