//! Little-endian cursor types over transaction bytes.
//!
//! [`Writer`] appends fixed-width fields to a growable buffer. [`Reader`]
//! consumes them from a borrowed slice and turns every short read into
//! [`Error::InvalidFormat`], so decoders can use `?` throughout and never
//! index past the end of a payload.

use bytes::{Buf, BufMut};

use crate::config::{ADDRESS_RAW_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::crypto::keys::{PublicKey, Signature};
use crate::error::{Error, Result};
use crate::model::mosaic::Mosaic;
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::model::unresolved::{UnresolvedAddress, UnresolvedMosaicId};

/// Size of an encoded mosaic: id and amount.
pub const MOSAIC_SIZE: usize = 16;

pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    pub fn u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn i16(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    pub fn u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    pub fn uint64(&mut self, value: UInt64) {
        self.u64(value.value());
    }

    pub fn bytes(&mut self, value: &[u8]) {
        self.buf.put_slice(value);
    }

    pub fn zeros(&mut self, count: usize) {
        self.buf.put_bytes(0, count);
    }

    pub fn address(&mut self, address: &UnresolvedAddress, network_type: NetworkType) {
        self.bytes(&address.to_bytes(network_type));
    }

    pub fn mosaic_id(&mut self, id: &UnresolvedMosaicId) {
        self.u64(id.to_u64());
    }

    pub fn mosaic(&mut self, mosaic: &Mosaic) {
        self.mosaic_id(&mosaic.id);
        self.uint64(mosaic.amount);
    }

    /// Zero-pads up to the next multiple of `alignment`.
    pub fn pad_to(&mut self, alignment: usize) {
        self.zeros(padding(self.buf.len(), alignment));
    }

    /// Overwrites four bytes at `offset`; used to patch size fields.
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

/// Bytes needed to round `len` up to a multiple of `alignment`.
pub fn padding(len: usize, alignment: usize) -> usize {
    (alignment - len % alignment) % alignment
}

pub struct Reader<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, consumed: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    fn need(&self, count: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < count {
            return Err(Error::invalid_format(format!(
                "truncated payload: {} needs {} bytes at offset {}, {} left",
                what,
                count,
                self.consumed,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.need(1, "u8")?;
        self.consumed += 1;
        Ok(self.buf.get_u8())
    }

    pub fn i8(&mut self) -> Result<i8> {
        self.need(1, "i8")?;
        self.consumed += 1;
        Ok(self.buf.get_i8())
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.need(2, "u16")?;
        self.consumed += 2;
        Ok(self.buf.get_u16_le())
    }

    pub fn i16(&mut self) -> Result<i16> {
        self.need(2, "i16")?;
        self.consumed += 2;
        Ok(self.buf.get_i16_le())
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.need(4, "u32")?;
        self.consumed += 4;
        Ok(self.buf.get_u32_le())
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.need(8, "u64")?;
        self.consumed += 8;
        Ok(self.buf.get_u64_le())
    }

    pub fn uint64(&mut self) -> Result<UInt64> {
        self.u64().map(UInt64::new)
    }

    pub fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.need(count, "byte field")?;
        let (head, tail) = self.buf.split_at(count);
        self.buf = tail;
        self.consumed += count;
        Ok(head)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.bytes(count).map(|_| ())
    }

    pub fn public_key(&mut self) -> Result<PublicKey> {
        Ok(PublicKey::from_bytes(self.array::<PUBLIC_KEY_LENGTH>()?))
    }

    /// Reads a public key slot; all zeros means "not set".
    pub fn optional_public_key(&mut self) -> Result<Option<PublicKey>> {
        let key = self.public_key()?;
        Ok((!key.is_zero()).then_some(key))
    }

    /// Reads a signature slot; all zeros means "not signed".
    pub fn optional_signature(&mut self) -> Result<Option<Signature>> {
        let signature = Signature::from_bytes(self.array::<SIGNATURE_LENGTH>()?);
        Ok((!signature.is_zero()).then_some(signature))
    }

    pub fn address(&mut self) -> Result<UnresolvedAddress> {
        UnresolvedAddress::from_bytes(self.array::<ADDRESS_RAW_LENGTH>()?)
            .map_err(|e| Error::invalid_format(e.to_string()))
    }

    pub fn mosaic_id(&mut self) -> Result<UnresolvedMosaicId> {
        self.u64().map(UnresolvedMosaicId::from_u64)
    }

    pub fn mosaic(&mut self) -> Result<Mosaic> {
        let id = self.mosaic_id()?;
        let amount = self.uint64()?;
        Ok(Mosaic { id, amount })
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(&self) -> Result<()> {
        if self.buf.has_remaining() {
            return Err(Error::invalid_format(format!(
                "{} trailing bytes after offset {}",
                self.buf.remaining(),
                self.consumed
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn little_endian_fields() {
        let mut w = Writer::with_capacity(16);
        w.u16(0x4154);
        w.u32(1);
        w.i8(-1);
        assert_eq!(w.into_vec(), vec![0x54, 0x41, 1, 0, 0, 0, 0xFF]);
    }

    #[test]
    fn padding_rounds_up() {
        assert_eq!(padding(0, 8), 0);
        assert_eq!(padding(1, 8), 7);
        assert_eq!(padding(8, 8), 0);
        assert_eq!(padding(161, 8), 7);

        let mut w = Writer::with_capacity(8);
        w.u8(1);
        w.pad_to(8);
        assert_eq!(w.len(), 8);
    }

    #[test]
    fn short_reads_are_format_errors() {
        let mut r = Reader::new(&[1, 2, 3]);
        assert_eq!(r.u16().unwrap(), 0x0201);
        let err = r.u32().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(r.position(), 2);
        assert_eq!(r.u8().unwrap(), 3);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn zero_slots_decode_as_none() {
        let zeros = [0u8; 96];
        let mut r = Reader::new(&zeros);
        assert!(r.optional_signature().unwrap().is_none());
        assert!(r.optional_public_key().unwrap().is_none());
    }

    #[test]
    fn trailing_bytes_rejected() {
        let r = Reader::new(&[0]);
        assert!(r.finish().is_err());
    }

    #[test]
    fn patch_overwrites_size_field() {
        let mut w = Writer::with_capacity(8);
        w.u32(0);
        w.u32(7);
        w.patch_u32(0, 8);
        assert_eq!(&w.into_vec()[..4], &[8, 0, 0, 0]);
    }
}
