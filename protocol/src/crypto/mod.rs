//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited implementations. Nothing here is
//! invented; it only fixes which primitive the ledger expects where.
//!
//! - **Ed25519** (`ed25519-dalek`) for signatures.
//! - **Edwards point multiplication** (`curve25519-dalek`) for message key
//!   agreement.
//! - **AES-256-GCM** (`aes-gcm`) for encrypted messages.
//! - **SHA3-256 / Keccak** (`sha3`) for hashes and ids, **SHA-256**
//!   (`sha2`) and **RIPEMD-160** (`ripemd`) for addresses and secrets.

pub mod encryption;
pub mod hash;
pub mod keys;

pub use encryption::{decrypt, encrypt};
pub use hash::{merkle_root, sha3_256};
pub use keys::{KeyPair, PublicKey, SignSchema, Signature};
