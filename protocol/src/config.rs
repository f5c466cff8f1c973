//! # Protocol Configuration & Constants
//!
//! Every fixed size and magic number of the wire format lives here, next to
//! the per-network parameters a node publishes. If you're hardcoding one of
//! these somewhere else, import it from here instead.
//!
//! The constants mirror the ledger's binary layout and must never change:
//! a node will reject anything that deviates by a single byte. The
//! [`NetworkConfig`] values, on the other hand, differ per network and are
//! normally loaded from the node's `/network/properties` document.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::network::NetworkType;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 private key (seed) length in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Hash output length for SHA3-256, SHA-256 and generation hashes.
pub const HASH_LENGTH: usize = 32;

/// Legacy BLS voting key length used by version 1 voting key links.
pub const VOTING_KEY_V1_LENGTH: usize = 48;

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce (IV) length in bytes.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// HKDF info label for the catapult key-derivation scheme.
pub const HKDF_INFO_CATAPULT: &[u8] = b"catapult";

/// Salt length for the NIS1 key-derivation scheme.
pub const NIS1_SALT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Wire Layout
// ---------------------------------------------------------------------------

/// Standalone transaction header: size, reserved, signature, signer,
/// reserved, version, network, type, max fee, deadline.
pub const TRANSACTION_HEADER_SIZE: usize = 4 + 4 + SIGNATURE_LENGTH + PUBLIC_KEY_LENGTH + 4 + 1 + 1 + 2 + 8 + 8;

/// Embedded transaction header: size, reserved, signer, reserved, version,
/// network, type.
pub const EMBEDDED_HEADER_SIZE: usize = 4 + 4 + PUBLIC_KEY_LENGTH + 4 + 1 + 1 + 2;

/// Byte offset of the signature inside a standalone payload.
pub const SIGNATURE_OFFSET: usize = 8;

/// Byte offset of the signer public key inside a standalone payload.
pub const SIGNER_OFFSET: usize = SIGNATURE_OFFSET + SIGNATURE_LENGTH;

/// Byte offset where the signed region starts (version byte).
pub const SIGNING_DATA_OFFSET: usize = SIGNER_OFFSET + PUBLIC_KEY_LENGTH + 4;

/// Signed region of an aggregate: header tail (20 bytes) + transactions hash.
pub const AGGREGATE_SIGNING_DATA_LENGTH: usize = 1 + 1 + 2 + 8 + 8 + HASH_LENGTH;

/// Fixed part of the aggregate body: transactions hash, payload size, reserved.
pub const AGGREGATE_BODY_FIXED_SIZE: usize = HASH_LENGTH + 4 + 4;

/// One cosignature: version (u64), signer, signature.
pub const COSIGNATURE_SIZE: usize = 8 + PUBLIC_KEY_LENGTH + SIGNATURE_LENGTH;

/// Embedded transactions inside an aggregate are padded to this boundary.
pub const EMBEDDED_ALIGNMENT: usize = 8;

/// Raw address length: network byte + RIPEMD-160 digest + 3-byte checksum.
pub const ADDRESS_RAW_LENGTH: usize = 24;

/// Base32 address length (24 bytes encoded, trailing pad character dropped).
pub const ADDRESS_ENCODED_LENGTH: usize = 39;

/// Address checksum length.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 3;

/// Marker that opens every persistent harvesting delegation message.
pub const HARVESTING_DELEGATION_MARKER: [u8; 8] = [0xFE, 0x2A, 0x80, 0x61, 0x57, 0x73, 0x01, 0xE2];

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Default maximum transfer message size in bytes, type tag included.
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// Maximum metadata value size in bytes.
pub const MAX_METADATA_VALUE_SIZE: usize = 1024;

/// Maximum namespace name part length.
pub const MAX_NAMESPACE_NAME_LENGTH: usize = 64;

/// Maximum mosaic divisibility.
pub const MAX_MOSAIC_DIVISIBILITY: u8 = 6;

/// Default maximum number of inner transactions per aggregate.
pub const MAX_TRANSACTIONS_PER_AGGREGATE: usize = 100;

/// Default maximum number of cosignatures per aggregate.
pub const MAX_COSIGNATURES_PER_AGGREGATE: usize = 25;

/// Default maximum serialized aggregate size in bytes (256 KiB).
pub const MAX_AGGREGATE_SIZE: usize = 256 * 1024;

/// Default deadline ceiling: 24 hours, in milliseconds.
pub const MAX_DEADLINE_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// Network presets
// ---------------------------------------------------------------------------

/// Public mainnet nemesis timestamp, seconds since the Unix epoch.
pub const MAINNET_EPOCH_ADJUSTMENT: i64 = 1_615_853_185;

/// Public testnet nemesis timestamp, seconds since the Unix epoch.
pub const TESTNET_EPOCH_ADJUSTMENT: i64 = 1_667_250_467;

/// Public mainnet generation hash.
pub const MAINNET_GENERATION_HASH: &str =
    "57F7DA205008026C776CB6AED843393F04CD458E0AA2D9F1D5F31A402072B2D6";

/// Public testnet generation hash.
pub const TESTNET_GENERATION_HASH: &str =
    "49D6E1CE276A85B70EAFE52349AACCA389302E7A9754BCF1221E79494FC665A4";

/// Floor and ceiling for deadlines created relative to "now".
///
/// This is a client-side policy; nodes apply their own limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlinePolicy {
    /// The window must be strictly greater than this many milliseconds.
    pub min_window_ms: i64,
    /// The window must not exceed this many milliseconds.
    pub max_window_ms: i64,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            min_window_ms: 0,
            max_window_ms: MAX_DEADLINE_WINDOW_MS,
        }
    }
}

/// Client-side size limits checked at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionLimits {
    pub max_message_size: usize,
    pub max_transactions_per_aggregate: usize,
    pub max_cosignatures_per_aggregate: usize,
    pub max_aggregate_size: usize,
}

impl Default for TransactionLimits {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            max_transactions_per_aggregate: MAX_TRANSACTIONS_PER_AGGREGATE,
            max_cosignatures_per_aggregate: MAX_COSIGNATURES_PER_AGGREGATE,
            max_aggregate_size: MAX_AGGREGATE_SIZE,
        }
    }
}

impl TransactionLimits {
    /// The widest limits the wire format can still encode: a message length
    /// travels in a u16 and an aggregate's payload size in a u32.
    pub fn wire() -> Self {
        Self {
            max_message_size: u16::MAX as usize,
            max_transactions_per_aggregate: usize::MAX,
            max_cosignatures_per_aggregate: usize::MAX,
            max_aggregate_size: u32::MAX as usize,
        }
    }
}

/// Per-network parameters.
///
/// Deserializes from a camelCase JSON document. Missing limit fields fall
/// back to the public network defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub network_type: NetworkType,
    /// Hex-encoded 32-byte generation hash.
    pub generation_hash: String,
    /// Nemesis block timestamp in seconds since the Unix epoch.
    pub epoch_adjustment: i64,
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    #[serde(default = "default_max_transactions_per_aggregate")]
    pub max_transactions_per_aggregate: usize,
    #[serde(default = "default_max_cosignatures_per_aggregate")]
    pub max_cosignatures_per_aggregate: usize,
    #[serde(default = "default_max_aggregate_size")]
    pub max_aggregate_size: usize,
    #[serde(default)]
    pub deadline_policy: DeadlinePolicy,
}

fn default_max_message_size() -> usize {
    MAX_MESSAGE_SIZE
}

fn default_max_transactions_per_aggregate() -> usize {
    MAX_TRANSACTIONS_PER_AGGREGATE
}

fn default_max_cosignatures_per_aggregate() -> usize {
    MAX_COSIGNATURES_PER_AGGREGATE
}

fn default_max_aggregate_size() -> usize {
    MAX_AGGREGATE_SIZE
}

impl NetworkConfig {
    /// Public mainnet parameters.
    pub fn mainnet() -> Self {
        Self::with_defaults(
            NetworkType::MainNet,
            MAINNET_GENERATION_HASH,
            MAINNET_EPOCH_ADJUSTMENT,
        )
    }

    /// Public testnet parameters.
    pub fn testnet() -> Self {
        Self::with_defaults(
            NetworkType::TestNet,
            TESTNET_GENERATION_HASH,
            TESTNET_EPOCH_ADJUSTMENT,
        )
    }

    fn with_defaults(network_type: NetworkType, generation_hash: &str, epoch: i64) -> Self {
        Self {
            network_type,
            generation_hash: generation_hash.to_string(),
            epoch_adjustment: epoch,
            max_message_size: MAX_MESSAGE_SIZE,
            max_transactions_per_aggregate: MAX_TRANSACTIONS_PER_AGGREGATE,
            max_cosignatures_per_aggregate: MAX_COSIGNATURES_PER_AGGREGATE,
            max_aggregate_size: MAX_AGGREGATE_SIZE,
            deadline_policy: DeadlinePolicy::default(),
        }
    }

    /// Parses a JSON properties document and validates the generation hash.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::invalid_argument(format!("network config: {}", e)))?;
        config.generation_hash_bytes()?;
        Ok(config)
    }

    /// Size limits enforced when building transactions for this network.
    pub fn limits(&self) -> TransactionLimits {
        TransactionLimits {
            max_message_size: self.max_message_size,
            max_transactions_per_aggregate: self.max_transactions_per_aggregate,
            max_cosignatures_per_aggregate: self.max_cosignatures_per_aggregate,
            max_aggregate_size: self.max_aggregate_size,
        }
    }

    /// Decodes the generation hash into its 32 raw bytes.
    pub fn generation_hash_bytes(&self) -> Result<[u8; HASH_LENGTH]> {
        let bytes = hex::decode(&self.generation_hash)?;
        bytes.as_slice().try_into().map_err(|_| {
            Error::invalid_argument(format!(
                "generation hash must be {} bytes, got {}",
                HASH_LENGTH,
                bytes.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes_match_layout() {
        assert_eq!(TRANSACTION_HEADER_SIZE, 128);
        assert_eq!(EMBEDDED_HEADER_SIZE, 48);
        assert_eq!(SIGNING_DATA_OFFSET, 108);
        assert_eq!(AGGREGATE_SIGNING_DATA_LENGTH, 52);
        assert_eq!(COSIGNATURE_SIZE, 104);
    }

    #[test]
    fn presets_have_valid_generation_hashes() {
        assert!(NetworkConfig::mainnet().generation_hash_bytes().is_ok());
        assert!(NetworkConfig::testnet().generation_hash_bytes().is_ok());
        assert_eq!(NetworkConfig::testnet().network_type, NetworkType::TestNet);
    }

    #[test]
    fn from_json_fills_defaults() {
        let json = r#"{
            "networkType": 152,
            "generationHash": "49D6E1CE276A85B70EAFE52349AACCA389302E7A9754BCF1221E79494FC665A4",
            "epochAdjustment": 1667250467,
            "maxMessageSize": 512
        }"#;
        let config = NetworkConfig::from_json(json).unwrap();
        assert_eq!(config.network_type, NetworkType::TestNet);
        assert_eq!(config.max_message_size, 512);
        assert_eq!(config.max_transactions_per_aggregate, 100);
        assert_eq!(config.deadline_policy, DeadlinePolicy::default());
        assert_eq!(config.limits().max_message_size, 512);
        assert_eq!(NetworkConfig::mainnet().limits(), TransactionLimits::default());
    }

    #[test]
    fn from_json_rejects_short_generation_hash() {
        let json = r#"{"networkType": 152, "generationHash": "ABCD", "epochAdjustment": 0}"#;
        assert!(NetworkConfig::from_json(json).is_err());
    }
}
