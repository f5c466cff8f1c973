//! Transfer: moves mosaics and/or a message to a recipient.
//!
//! ```text
//! recipient      [u8; 24]   unresolved address
//! message_size   u16
//! mosaics_count  u8
//! reserved       u32 + u8
//! mosaics        [id u64, amount u64] * count, ascending by id
//! message        [u8; message_size], first byte is the message type
//! ```

use crate::config::TransactionLimits;
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::message::Message;
use crate::model::mosaic::Mosaic;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::unresolved::UnresolvedAddress;
use crate::receipt::resolver::ResolutionContext;
use crate::transaction::body::{check_count, check_network, read_list, BodyCodec};
use crate::transaction::codec::{Reader, Writer, MOSAIC_SIZE};

const FIXED_SIZE: usize = 24 + 2 + 1 + 4 + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferBody {
    pub recipient: UnresolvedAddress,
    pub mosaics: Vec<Mosaic>,
    pub message: Message,
}

impl TransferBody {
    /// Mosaics are kept sorted by id, which is the order the ledger requires.
    pub fn new(recipient: impl Into<UnresolvedAddress>, mut mosaics: Vec<Mosaic>, message: Message) -> Self {
        sort_mosaics(&mut mosaics);
        Self {
            recipient: recipient.into(),
            mosaics,
            message,
        }
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let recipient = r.address()?;
        let message_size = r.u16()? as usize;
        let mosaics_count = r.u8()? as usize;
        r.skip(4 + 1)?;
        let mosaics = read_list(r, mosaics_count, Reader::mosaic)?;
        let message = if message_size == 0 {
            Message::empty()
        } else {
            Message::from_bytes(r.bytes(message_size)?)
        };
        Ok(Self {
            recipient,
            mosaics,
            message,
        })
    }
}

pub(crate) fn sort_mosaics(mosaics: &mut [Mosaic]) {
    mosaics.sort_by_key(|m| m.id.to_u64());
}

impl BodyCodec for TransferBody {
    fn size(&self) -> usize {
        FIXED_SIZE + MOSAIC_SIZE * self.mosaics.len() + self.message.size()
    }

    fn write(&self, w: &mut Writer, network_type: NetworkType) {
        let message = self.message.to_bytes();
        let mut mosaics = self.mosaics.clone();
        sort_mosaics(&mut mosaics);

        w.address(&self.recipient, network_type);
        w.u16(message.len() as u16);
        w.u8(mosaics.len() as u8);
        w.u32(0);
        w.u8(0);
        for mosaic in &mosaics {
            w.mosaic(mosaic);
        }
        w.bytes(&message);
    }

    fn validate(&self, network_type: NetworkType, limits: &TransactionLimits) -> Result<()> {
        check_network(&self.recipient, network_type)?;
        check_count("transfer mosaics", self.mosaics.len())?;
        if self.message.size() > limits.max_message_size {
            return Err(Error::invalid_argument(format!(
                "message of {} bytes exceeds the {} byte limit",
                self.message.size(),
                limits.max_message_size
            )));
        }
        Ok(())
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        let mosaics = self
            .mosaics
            .iter()
            .map(|m| Ok(Mosaic::new(ctx.mosaic_id(&m.id)?, m.amount)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(ctx.address(&self.recipient)?, mosaics, self.message.clone()))
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.recipient.refers_to(address, aliases)
    }

    fn has_aliases(&self) -> bool {
        self.recipient.is_alias() || self.mosaics.iter().any(|m| m.id.is_alias())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_MESSAGE_SIZE;
    use crate::crypto::keys::PublicKey;
    use crate::model::mosaic::MosaicId;
    use crate::model::unresolved::UnresolvedMosaicId;

    fn recipient() -> Address {
        Address::from_public_key(&PublicKey::from_bytes([3u8; 32]), NetworkType::TestNet)
    }

    fn encode(body: &TransferBody) -> Vec<u8> {
        let mut w = Writer::with_capacity(body.size());
        body.write(&mut w, NetworkType::TestNet);
        w.into_vec()
    }

    #[test]
    fn mosaics_are_sorted() {
        let high = Mosaic::new(MosaicId::new(0x7000).unwrap(), 1u64);
        let low = Mosaic::new(MosaicId::new(0x0100).unwrap(), 2u64);
        let body = TransferBody::new(recipient(), vec![high, low], Message::empty());
        assert_eq!(body.mosaics[0], low);

        let bytes = encode(&body);
        assert_eq!(&bytes[32..40], &0x0100u64.to_le_bytes());
    }

    #[test]
    fn layout_and_decode() {
        let body = TransferBody::new(
            recipient(),
            vec![Mosaic::new(MosaicId::new(0x1234).unwrap(), 10u64)],
            Message::plain("hi").unwrap(),
        );
        let bytes = encode(&body);
        assert_eq!(bytes.len(), body.size());
        assert_eq!(&bytes[24..27], &[3, 0, 1]);
        assert_eq!(&bytes[bytes.len() - 3..], &[0, b'h', b'i']);

        let mut r = Reader::new(&bytes);
        assert_eq!(TransferBody::read(&mut r).unwrap(), body);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn oversized_message_rejected() {
        let body = TransferBody::new(recipient(), vec![], Message::Raw(vec![0; MAX_MESSAGE_SIZE + 1]));
        let err = body
            .validate(NetworkType::TestNet, &TransactionLimits::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn foreign_network_recipient_rejected() {
        let body = TransferBody::new(recipient(), vec![], Message::empty());
        assert!(body
            .validate(NetworkType::MainNet, &TransactionLimits::default())
            .is_err());
    }

    #[test]
    fn notifies_recipient_and_alias() {
        let alias = NamespaceId::from_name("alice").unwrap();
        let body = TransferBody::new(alias, vec![], Message::empty());
        assert!(body.has_aliases());
        assert!(body.notifies(&recipient(), &[alias]));
        assert!(!body.notifies(&recipient(), &[]));

        let mosaic = Mosaic::new(UnresolvedMosaicId::Alias(alias), 1u64);
        let body = TransferBody::new(recipient(), vec![mosaic], Message::empty());
        assert!(body.has_aliases());
        assert!(body.notifies(&recipient(), &[]));
    }
}
