//! Decoding wire payloads back into typed transactions.
//!
//! Decoding is the exact inverse of [`Transaction::serialize`] and
//! [`InnerTransaction::serialize_embedded`]: the header's declared size must
//! match the payload, the body is dispatched on `(type, version)`, and every
//! body byte must be consumed. All-zero signature and signer slots decode to
//! `None`.

use tracing::debug;

use crate::config::{EMBEDDED_HEADER_SIZE, TRANSACTION_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::transaction::body::TransactionBody;
use crate::transaction::builder::{InnerTransaction, Transaction};
use crate::transaction::codec::Reader;
use crate::transaction::deadline::Deadline;
use crate::transaction::header::{EmbeddedHeader, StandaloneHeader};

/// A payload decoded in either form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedTransaction {
    Standalone(Transaction),
    Embedded(InnerTransaction),
}

impl DecodedTransaction {
    pub fn into_standalone(self) -> Option<Transaction> {
        match self {
            Self::Standalone(tx) => Some(tx),
            Self::Embedded(_) => None,
        }
    }

    pub fn into_embedded(self) -> Option<InnerTransaction> {
        match self {
            Self::Embedded(tx) => Some(tx),
            Self::Standalone(_) => None,
        }
    }
}

/// Decodes a hex payload, standalone or embedded.
pub fn create_from_payload(payload_hex: &str, is_embedded: bool) -> Result<DecodedTransaction> {
    let bytes = hex::decode(payload_hex)
        .map_err(|e| Error::invalid_format(format!("payload is not hex: {}", e)))?;
    if is_embedded {
        InnerTransaction::from_embedded_payload(&bytes).map(DecodedTransaction::Embedded)
    } else {
        Transaction::from_payload(&bytes).map(DecodedTransaction::Standalone)
    }
}

impl Transaction {
    /// Decodes a standalone payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let header = StandaloneHeader::read(&mut r)?;
        check_declared_size(header.size as usize, payload.len(), TRANSACTION_HEADER_SIZE)?;
        debug!(
            transaction_type = %header.transaction_type,
            version = header.version,
            size = header.size,
            "decoding transaction"
        );

        let body = TransactionBody::read(header.transaction_type, header.version, &mut r)?;
        r.finish()?;
        Ok(Self::from_parts(
            header.network_type,
            Deadline::from_adjusted(header.deadline),
            header.max_fee,
            header.signature,
            header.signer,
            body,
        ))
    }

    /// Decodes an uppercase or lowercase hex payload.
    pub fn from_hex(payload_hex: &str) -> Result<Self> {
        create_from_payload(payload_hex, false)?
            .into_standalone()
            .ok_or_else(|| Error::invalid_format("expected a standalone transaction"))
    }
}

impl InnerTransaction {
    /// Decodes one embedded transaction without alignment padding.
    pub fn from_embedded_payload(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let inner = decode_embedded(&mut r)?;
        r.finish()?;
        Ok(inner)
    }
}

fn check_declared_size(declared: usize, available: usize, header_size: usize) -> Result<()> {
    if declared < header_size || declared != available {
        return Err(Error::invalid_format(format!(
            "header declares {} bytes, payload has {}",
            declared, available
        )));
    }
    Ok(())
}

/// Reads one embedded transaction, using its declared size as the body
/// boundary. Aggregates cannot be embedded.
pub(crate) fn decode_embedded(r: &mut Reader) -> Result<InnerTransaction> {
    let header = EmbeddedHeader::read(r)?;
    let declared = header.size as usize;
    if declared < EMBEDDED_HEADER_SIZE || declared - EMBEDDED_HEADER_SIZE > r.remaining() {
        return Err(Error::invalid_format(format!(
            "embedded {} declares {} bytes, {} available",
            header.transaction_type,
            declared,
            r.remaining() + EMBEDDED_HEADER_SIZE
        )));
    }
    if header.transaction_type.is_aggregate() {
        return Err(Error::invalid_format("aggregate embedded in an aggregate"));
    }
    debug!(
        transaction_type = %header.transaction_type,
        version = header.version,
        size = header.size,
        "decoding embedded transaction"
    );

    let mut body_reader = Reader::new(r.bytes(declared - EMBEDDED_HEADER_SIZE)?);
    let body = TransactionBody::read(header.transaction_type, header.version, &mut body_reader)?;
    body_reader.finish()?;

    Ok(InnerTransaction {
        signer: header.signer,
        network_type: header.network_type,
        body,
        info: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::PublicKey;
    use crate::model::account::PublicAccount;
    use crate::model::message::Message;
    use crate::model::network::NetworkType;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::key_link::{KeyLinkBody, VotingKey, VotingKeyLinkBody};
    use crate::transaction::transfer::TransferBody;
    use crate::transaction::types::LinkAction;

    fn transfer() -> Transaction {
        let recipient = PublicAccount::new(PublicKey::from_bytes([1; 32]), NetworkType::TestNet).address();
        TransactionBuilder::new(
            NetworkType::TestNet,
            TransactionBody::Transfer(TransferBody::new(recipient, vec![], Message::plain("hello").unwrap())),
        )
        .deadline(Deadline::from_adjusted(12_345u64))
        .max_fee(200u64)
        .build()
        .unwrap()
    }

    #[test]
    fn standalone_round_trip() {
        let tx = transfer();
        let decoded = Transaction::from_hex(&tx.to_hex()).unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.signer().is_none());
        assert!(decoded.signature().is_none());
    }

    #[test]
    fn embedded_round_trip() {
        let inner = transfer()
            .to_aggregate(&PublicAccount::new(PublicKey::from_bytes([2; 32]), NetworkType::TestNet))
            .unwrap();
        let decoded = create_from_payload(&hex::encode(inner.serialize_embedded()), true)
            .unwrap()
            .into_embedded()
            .unwrap();
        assert_eq!(decoded, inner);
    }

    #[test]
    fn version_selects_layout() {
        let body = VotingKeyLinkBody {
            linked_public_key: VotingKey::V1([3; 48]),
            start_epoch: 1,
            end_epoch: 2,
            link_action: LinkAction::Link,
        };
        let tx = TransactionBuilder::new(NetworkType::TestNet, TransactionBody::VotingKeyLink(body))
            .build()
            .unwrap();
        assert_eq!(tx.version(), 1);
        assert_eq!(Transaction::from_payload(&tx.serialize()).unwrap(), tx);

        let mut bytes = tx.serialize();
        bytes[108] = 9;
        assert!(matches!(Transaction::from_payload(&bytes), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn declared_size_must_match() {
        let mut bytes = transfer().serialize();
        bytes.push(0);
        assert!(matches!(Transaction::from_payload(&bytes), Err(Error::InvalidFormat(_))));

        bytes.pop();
        bytes[0] = bytes[0].wrapping_add(1);
        assert!(matches!(Transaction::from_payload(&bytes), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn unknown_type_is_format_error() {
        let mut bytes = TransactionBuilder::new(
            NetworkType::TestNet,
            TransactionBody::AccountKeyLink(KeyLinkBody::new(PublicKey::default(), LinkAction::Link)),
        )
        .build()
        .unwrap()
        .serialize();
        bytes[110] = 0xFF;
        bytes[111] = 0xFF;
        assert!(matches!(Transaction::from_payload(&bytes), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn non_hex_payload_rejected() {
        assert!(matches!(create_from_payload("XYZ", false), Err(Error::InvalidFormat(_))));
    }
}
