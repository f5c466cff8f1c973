//! Transaction headers and confirmation metadata.
//!
//! ```text
//! standalone (128 bytes)                 embedded (48 bytes)
//! ----------------------                 -------------------
//! size               u32                 size               u32
//! reserved           u32                 reserved           u32
//! signature          [u8; 64]            signer             [u8; 32]
//! signer             [u8; 32]            reserved           u32
//! reserved           u32                 version            u8
//! version            u8                  network            u8
//! network            u8                  type               u16
//! type               u16
//! max_fee            u64
//! deadline           u64
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{EMBEDDED_HEADER_SIZE, TRANSACTION_HEADER_SIZE};
use crate::crypto::keys::{PublicKey, Signature};
use crate::error::{Error, Result};
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::transaction::codec::{Reader, Writer};
use crate::transaction::types::TransactionType;

/// Where a transaction landed on chain. Only present on transactions
/// decoded from node responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub height: UInt64,
    /// 0-based index in the block, or in the parent aggregate for embedded
    /// transactions.
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_component_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_id: Option<String>,
}

impl TransactionInfo {
    pub fn new(height: impl Into<UInt64>, index: u32) -> Self {
        Self {
            height: height.into(),
            index,
            ..Self::default()
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn is_embedded(&self) -> bool {
        self.aggregate_hash.is_some() || self.aggregate_id.is_some()
    }
}

/// Header fields of a standalone transaction as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StandaloneHeader {
    pub size: u32,
    pub signature: Option<Signature>,
    pub signer: Option<PublicKey>,
    pub version: u8,
    pub network_type: NetworkType,
    pub transaction_type: TransactionType,
    pub max_fee: UInt64,
    pub deadline: UInt64,
}

impl StandaloneHeader {
    pub fn write(&self, w: &mut Writer) {
        w.u32(self.size);
        w.u32(0);
        match &self.signature {
            Some(signature) => w.bytes(signature.as_bytes()),
            None => w.zeros(64),
        }
        match &self.signer {
            Some(signer) => w.bytes(signer.as_bytes()),
            None => w.zeros(32),
        }
        w.u32(0);
        w.u8(self.version);
        w.u8(self.network_type.as_u8());
        w.u16(self.transaction_type.value());
        w.uint64(self.max_fee);
        w.uint64(self.deadline);
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        if r.remaining() < TRANSACTION_HEADER_SIZE {
            return Err(Error::invalid_format(format!(
                "payload of {} bytes is shorter than the {} byte header",
                r.remaining(),
                TRANSACTION_HEADER_SIZE
            )));
        }
        let size = r.u32()?;
        r.skip(4)?;
        let signature = r.optional_signature()?;
        let signer = r.optional_public_key()?;
        r.skip(4)?;
        let version = r.u8()?;
        let network_type = NetworkType::try_from(r.u8()?)?;
        let transaction_type = TransactionType::try_from(r.u16()?)?;
        let max_fee = r.uint64()?;
        let deadline = r.uint64()?;
        Ok(Self {
            size,
            signature,
            signer,
            version,
            network_type,
            transaction_type,
            max_fee,
            deadline,
        })
    }
}

/// Header fields of an embedded transaction as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmbeddedHeader {
    pub size: u32,
    pub signer: PublicKey,
    pub version: u8,
    pub network_type: NetworkType,
    pub transaction_type: TransactionType,
}

impl EmbeddedHeader {
    pub fn write(&self, w: &mut Writer) {
        w.u32(self.size);
        w.u32(0);
        w.bytes(self.signer.as_bytes());
        w.u32(0);
        w.u8(self.version);
        w.u8(self.network_type.as_u8());
        w.u16(self.transaction_type.value());
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        if r.remaining() < EMBEDDED_HEADER_SIZE {
            return Err(Error::invalid_format(format!(
                "payload of {} bytes is shorter than the {} byte embedded header",
                r.remaining(),
                EMBEDDED_HEADER_SIZE
            )));
        }
        let size = r.u32()?;
        r.skip(4)?;
        let signer = r.public_key()?;
        r.skip(4)?;
        let version = r.u8()?;
        let network_type = NetworkType::try_from(r.u8()?)?;
        let transaction_type = TransactionType::try_from(r.u16()?)?;
        Ok(Self {
            size,
            signer,
            version,
            network_type,
            transaction_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StandaloneHeader {
        StandaloneHeader {
            size: 161,
            signature: None,
            signer: None,
            version: 1,
            network_type: NetworkType::TestNet,
            transaction_type: TransactionType::AccountKeyLink,
            max_fee: UInt64::new(100),
            deadline: UInt64::new(1),
        }
    }

    #[test]
    fn standalone_layout() {
        let mut w = Writer::with_capacity(TRANSACTION_HEADER_SIZE);
        sample().write(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), TRANSACTION_HEADER_SIZE);
        assert_eq!(&bytes[..4], &[0xA1, 0, 0, 0]);
        assert_eq!(&bytes[108..112], &[0x01, 0x98, 0x4C, 0x41]);
        assert_eq!(StandaloneHeader::read(&mut Reader::new(&bytes)).unwrap(), sample());
    }

    #[test]
    fn embedded_layout() {
        let header = EmbeddedHeader {
            size: 81,
            signer: PublicKey::from_bytes([7u8; 32]),
            version: 1,
            network_type: NetworkType::MainNet,
            transaction_type: TransactionType::NodeKeyLink,
        };
        let mut w = Writer::with_capacity(EMBEDDED_HEADER_SIZE);
        header.write(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), EMBEDDED_HEADER_SIZE);
        assert_eq!(&bytes[44..48], &[0x01, 0x68, 0x4C, 0x42]);
        assert_eq!(EmbeddedHeader::read(&mut Reader::new(&bytes)).unwrap(), header);
    }

    #[test]
    fn short_header_rejected() {
        let err = StandaloneHeader::read(&mut Reader::new(&[0u8; 64])).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn info_from_rest_meta() {
        let info: TransactionInfo = serde_json::from_str(
            r#"{"height":"42","index":3,"hash":"AB","merkleComponentHash":"CD"}"#,
        )
        .unwrap();
        assert_eq!(info.height, UInt64::new(42));
        assert_eq!(info.index, 3);
        assert!(!info.is_embedded());
    }
}
