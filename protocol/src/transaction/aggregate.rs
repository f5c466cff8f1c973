//! Aggregate transactions.
//!
//! An aggregate bundles embedded transactions under one signature plus any
//! number of cosignatures. The body layout is:
//!
//! ```text
//! transactions_hash   [u8; 32]    merkle root of the embedded hashes
//! payload_size        u32         bytes of the embedded block below
//! reserved            u32
//! transactions        embedded transactions, each padded to 8 bytes
//! cosignatures        [version u64, signer [u8; 32], signature [u8; 64]] *
//! ```
//!
//! The decoder walks the embedded block using each transaction's own size
//! field and never reads past `payload_size`; the cosignatures fill the
//! rest of the body exactly.

use tracing::debug;

use crate::config::{
    TransactionLimits, COSIGNATURE_SIZE, EMBEDDED_ALIGNMENT, HASH_LENGTH, TRANSACTION_HEADER_SIZE,
};
use crate::crypto::hash::merkle_root;
use crate::error::{Error, Result};
use crate::model::account::{Account, PublicAccount};
use crate::model::address::Address;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::receipt::resolver::ResolutionContext;
use crate::transaction::body::{BodyCodec, TransactionBody};
use crate::transaction::builder::{InnerTransaction, Transaction};
use crate::transaction::codec::{padding, Reader, Writer};
use crate::transaction::cosignature::{AggregateCosignature, CosignatureSignedTransaction};
use crate::transaction::deadline::Deadline;
use crate::transaction::mapping::decode_embedded;
use crate::transaction::signing::SignedTransaction;
use crate::transaction::types::TransactionType;

/// Version used for newly built aggregates.
pub const AGGREGATE_VERSION: u8 = 2;

/// Lifecycle variant, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    /// Fully signed before announcement.
    Complete,
    /// Announced partially signed; cosignatures arrive later.
    Bonded,
}

impl AggregateKind {
    pub fn transaction_type(self) -> TransactionType {
        match self {
            Self::Complete => TransactionType::AggregateComplete,
            Self::Bonded => TransactionType::AggregateBonded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateBody {
    pub kind: AggregateKind,
    pub version: u8,
    pub inner_transactions: Vec<InnerTransaction>,
    pub cosignatures: Vec<AggregateCosignature>,
}

impl AggregateBody {
    pub fn new(
        kind: AggregateKind,
        inner_transactions: Vec<InnerTransaction>,
        cosignatures: Vec<AggregateCosignature>,
    ) -> Self {
        Self {
            kind,
            version: AGGREGATE_VERSION,
            inner_transactions,
            cosignatures,
        }
    }

    /// Merkle root over the SHA3-256 of each embedded transaction.
    pub fn transactions_hash(&self) -> [u8; HASH_LENGTH] {
        let leaves: Vec<[u8; HASH_LENGTH]> = self.inner_transactions.iter().map(InnerTransaction::hash).collect();
        merkle_root(&leaves)
    }

    /// Size of the embedded block, padding included.
    pub fn payload_size(&self) -> usize {
        self.inner_transactions
            .iter()
            .map(|tx| tx.size() + padding(tx.size(), EMBEDDED_ALIGNMENT))
            .sum()
    }

    pub(crate) fn read(r: &mut Reader, kind: AggregateKind, version: u8) -> Result<Self> {
        r.skip(HASH_LENGTH)?;
        let payload_size = r.u32()? as usize;
        r.skip(4)?;
        if payload_size > r.remaining() {
            return Err(Error::invalid_format(format!(
                "aggregate declares {} bytes of transactions, {} available",
                payload_size,
                r.remaining()
            )));
        }

        let mut block = Reader::new(r.bytes(payload_size)?);
        let mut inner_transactions = Vec::new();
        while block.remaining() > 0 {
            inner_transactions.push(read_embedded(&mut block)?);
        }

        if r.remaining() % COSIGNATURE_SIZE != 0 {
            return Err(Error::invalid_format(format!(
                "{} trailing bytes do not form whole cosignatures",
                r.remaining()
            )));
        }
        let mut cosignatures = Vec::with_capacity(r.remaining() / COSIGNATURE_SIZE);
        while r.remaining() > 0 {
            cosignatures.push(AggregateCosignature::read(r)?);
        }

        Ok(Self {
            kind,
            version,
            inner_transactions,
            cosignatures,
        })
    }
}

/// Reads one embedded transaction and its alignment padding.
fn read_embedded(r: &mut Reader) -> Result<InnerTransaction> {
    let start = r.position();
    let inner = decode_embedded(r)?;
    r.skip(padding(r.position() - start, EMBEDDED_ALIGNMENT))?;
    Ok(inner)
}

impl BodyCodec for AggregateBody {
    fn size(&self) -> usize {
        HASH_LENGTH + 4 + 4 + self.payload_size() + COSIGNATURE_SIZE * self.cosignatures.len()
    }

    fn write(&self, w: &mut Writer, _network_type: NetworkType) {
        w.bytes(&self.transactions_hash());
        w.u32(self.payload_size() as u32);
        w.u32(0);
        for tx in &self.inner_transactions {
            w.bytes(&tx.serialize_embedded());
            w.pad_to(EMBEDDED_ALIGNMENT);
        }
        for cosignature in &self.cosignatures {
            cosignature.write(w);
        }
    }

    fn validate(&self, network_type: NetworkType, limits: &TransactionLimits) -> Result<()> {
        if self.inner_transactions.len() > limits.max_transactions_per_aggregate {
            return Err(Error::invalid_argument(format!(
                "aggregate holds {} transactions, at most {} allowed",
                self.inner_transactions.len(),
                limits.max_transactions_per_aggregate
            )));
        }
        if self.cosignatures.len() > limits.max_cosignatures_per_aggregate {
            return Err(Error::invalid_argument(format!(
                "aggregate holds {} cosignatures, at most {} allowed",
                self.cosignatures.len(),
                limits.max_cosignatures_per_aggregate
            )));
        }
        let total = TRANSACTION_HEADER_SIZE + self.size();
        if total > limits.max_aggregate_size {
            return Err(Error::invalid_argument(format!(
                "aggregate of {} bytes exceeds the {} byte limit",
                total, limits.max_aggregate_size
            )));
        }
        self.inner_transactions
            .iter()
            .try_for_each(|tx| tx.validate(network_type, limits))
    }

    fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        let inner_transactions = self
            .inner_transactions
            .iter()
            .enumerate()
            .map(|(i, tx)| tx.resolve(&ctx.inner(i)?))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            inner_transactions,
            ..self.clone()
        })
    }

    fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        self.inner_transactions
            .iter()
            .any(|tx| tx.notifies(address, aliases))
            || self
                .cosignatures
                .iter()
                .any(|c| Address::from_public_key(&c.signer, address.network_type()) == *address)
    }

    fn has_aliases(&self) -> bool {
        self.inner_transactions.iter().any(|tx| tx.body.has_aliases())
    }
}

// ---------------------------------------------------------------------------
// Aggregate operations on Transaction
// ---------------------------------------------------------------------------

impl Transaction {
    /// A complete aggregate, validated against the public network limits.
    /// Build an [`AggregateBody`] through
    /// [`TransactionBuilder::limits`](crate::transaction::TransactionBuilder::limits)
    /// for other limits.
    pub fn create_complete(
        deadline: Deadline,
        inner_transactions: Vec<InnerTransaction>,
        network_type: NetworkType,
        cosignatures: Vec<AggregateCosignature>,
        max_fee: impl Into<UInt64>,
    ) -> Result<Self> {
        Self::create_aggregate(AggregateKind::Complete, deadline, inner_transactions, network_type, cosignatures, max_fee)
    }

    /// A bonded aggregate, validated against the public network limits.
    pub fn create_bonded(
        deadline: Deadline,
        inner_transactions: Vec<InnerTransaction>,
        network_type: NetworkType,
        cosignatures: Vec<AggregateCosignature>,
        max_fee: impl Into<UInt64>,
    ) -> Result<Self> {
        Self::create_aggregate(AggregateKind::Bonded, deadline, inner_transactions, network_type, cosignatures, max_fee)
    }

    fn create_aggregate(
        kind: AggregateKind,
        deadline: Deadline,
        inner_transactions: Vec<InnerTransaction>,
        network_type: NetworkType,
        cosignatures: Vec<AggregateCosignature>,
        max_fee: impl Into<UInt64>,
    ) -> Result<Self> {
        let body = AggregateBody::new(kind, inner_transactions, cosignatures);
        body.validate(network_type, &TransactionLimits::default())?;
        Ok(Self::from_parts(
            network_type,
            deadline,
            max_fee.into(),
            None,
            None,
            TransactionBody::Aggregate(body),
        ))
    }

    fn aggregate_body(&self) -> Result<&AggregateBody> {
        self.body().as_aggregate().ok_or_else(|| {
            Error::unsupported(format!("{} is not an aggregate", self.transaction_type()))
        })
    }

    fn with_aggregate(&self, body: AggregateBody) -> Result<Self> {
        body.validate(self.network_type(), self.limits())?;
        Ok(self.with_body(TransactionBody::Aggregate(body)))
    }

    pub fn inner_transactions(&self) -> &[InnerTransaction] {
        self.body()
            .as_aggregate()
            .map(|b| b.inner_transactions.as_slice())
            .unwrap_or(&[])
    }

    pub fn cosignatures(&self) -> &[AggregateCosignature] {
        self.body()
            .as_aggregate()
            .map(|b| b.cosignatures.as_slice())
            .unwrap_or(&[])
    }

    /// Copy with `transactions` appended.
    pub fn add_transactions(&self, transactions: Vec<InnerTransaction>) -> Result<Self> {
        let mut body = self.aggregate_body()?.clone();
        body.inner_transactions.extend(transactions);
        self.with_aggregate(body)
    }

    /// Copy with `cosignatures` appended.
    pub fn add_cosignatures(&self, cosignatures: Vec<AggregateCosignature>) -> Result<Self> {
        let mut body = self.aggregate_body()?.clone();
        body.cosignatures.extend(cosignatures);
        self.with_aggregate(body)
    }

    /// Copy whose fee covers the aggregate once it carries
    /// `required_cosignatures` cosignatures (or its current ones, if more).
    pub fn set_max_fee_for_aggregate(&self, multiplier: u32, required_cosignatures: usize) -> Result<Self> {
        let body = self.aggregate_body()?;
        let current = body.cosignatures.len();
        let size = self.size() - current * COSIGNATURE_SIZE + required_cosignatures.max(current) * COSIGNATURE_SIZE;
        Ok(self.with_max_fee(size as u64 * u64::from(multiplier)))
    }

    /// Signs as `initiator`, then has every account in `cosignatories`
    /// cosign the resulting hash.
    pub fn sign_transaction_with_cosignatories(
        &self,
        initiator: &Account,
        cosignatories: &[Account],
        generation_hash: &[u8; HASH_LENGTH],
    ) -> Result<SignedTransaction> {
        let (signed, hash) = self.sign_parts(initiator, generation_hash)?;
        let cosignatures = cosignatories
            .iter()
            .map(|account| AggregateCosignature::sign(account, &hash))
            .collect();
        self.finish_cosigned(signed, hash, cosignatures)
    }

    /// Signs as `initiator` and attaches cosignatures collected elsewhere.
    pub fn sign_transaction_given_signatures(
        &self,
        initiator: &Account,
        cosigned: &[CosignatureSignedTransaction],
        generation_hash: &[u8; HASH_LENGTH],
    ) -> Result<SignedTransaction> {
        let (signed, hash) = self.sign_parts(initiator, generation_hash)?;
        let cosignatures = cosigned.iter().map(AggregateCosignature::from).collect();
        self.finish_cosigned(signed, hash, cosignatures)
    }

    fn finish_cosigned(
        &self,
        signed: Transaction,
        hash: [u8; HASH_LENGTH],
        cosignatures: Vec<AggregateCosignature>,
    ) -> Result<SignedTransaction> {
        let with_cosignatures = signed.add_cosignatures(cosignatures)?;
        debug!(
            hash = %hex::encode_upper(hash),
            cosignatures = with_cosignatures.cosignatures().len(),
            "signed aggregate with cosignatures"
        );
        Ok(SignedTransaction::new(&with_cosignatures, hash))
    }

    /// `true` when `account` signed or cosigned this aggregate.
    pub fn signed_by_account(&self, account: &PublicAccount) -> bool {
        self.signer() == Some(&account.public_key)
            || self
                .cosignatures()
                .iter()
                .any(|c| c.signer == account.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::PublicKey;
    use crate::model::message::Message;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::key_link::KeyLinkBody;
    use crate::transaction::transfer::TransferBody;
    use crate::transaction::types::LinkAction;

    fn signer() -> PublicAccount {
        PublicAccount::new(PublicKey::from_bytes([9; 32]), NetworkType::TestNet)
    }

    fn inner_transfer(text: &str) -> InnerTransaction {
        TransactionBuilder::new(
            NetworkType::TestNet,
            TransactionBody::Transfer(TransferBody::new(signer().address(), vec![], Message::plain(text).unwrap())),
        )
        .build()
        .unwrap()
        .to_aggregate(&signer())
        .unwrap()
    }

    fn inner_key_link() -> InnerTransaction {
        TransactionBuilder::new(
            NetworkType::TestNet,
            TransactionBody::AccountKeyLink(KeyLinkBody::new(PublicKey::from_bytes([4; 32]), LinkAction::Link)),
        )
        .build()
        .unwrap()
        .to_aggregate(&signer())
        .unwrap()
    }

    fn aggregate(inner: Vec<InnerTransaction>) -> Transaction {
        Transaction::create_complete(Deadline::from_adjusted(1u64), inner, NetworkType::TestNet, vec![], 0u64).unwrap()
    }

    fn decode_body(tx: &Transaction) -> Result<AggregateBody> {
        let bytes = tx.serialize();
        AggregateBody::read(&mut Reader::new(&bytes[TRANSACTION_HEADER_SIZE..]), AggregateKind::Complete, 2)
    }

    #[test]
    fn inner_transactions_are_padded() {
        // 48 + 33 = 81 bytes, padded to 88.
        let tx = aggregate(vec![inner_key_link()]);
        let body = tx.body().as_aggregate().unwrap();
        assert_eq!(body.payload_size(), 88);
        assert_eq!(tx.size(), TRANSACTION_HEADER_SIZE + 40 + 88);
        assert_eq!(tx.serialize().len(), tx.size());
    }

    #[test]
    fn decode_walks_declared_sizes() {
        let tx = aggregate(vec![inner_transfer("a"), inner_key_link(), inner_transfer("bcd")]);
        let decoded = decode_body(&tx).unwrap();
        assert_eq!(&decoded, tx.body().as_aggregate().unwrap());
    }

    #[test]
    fn transactions_hash_is_merkle_root() {
        let tx = aggregate(vec![inner_transfer("a"), inner_key_link()]);
        let body = tx.body().as_aggregate().unwrap();
        let expected = merkle_root(&[body.inner_transactions[0].hash(), body.inner_transactions[1].hash()]);
        assert_eq!(&tx.serialize()[TRANSACTION_HEADER_SIZE..TRANSACTION_HEADER_SIZE + 32], &expected);
    }

    #[test]
    fn corrupted_payload_size_is_format_error() {
        let tx = aggregate(vec![inner_key_link()]);
        let mut bytes = tx.serialize();
        let at = TRANSACTION_HEADER_SIZE + 32;
        for bogus in [1_000u32, 40] {
            bytes[at..at + 4].copy_from_slice(&bogus.to_le_bytes());
            let err = AggregateBody::read(
                &mut Reader::new(&bytes[TRANSACTION_HEADER_SIZE..]),
                AggregateKind::Complete,
                2,
            )
            .unwrap_err();
            assert!(matches!(err, Error::InvalidFormat(_)), "payload size {}", bogus);
        }
    }

    #[test]
    fn nested_aggregates_rejected() {
        let nested = aggregate(vec![]);
        assert!(matches!(nested.to_aggregate(&signer()), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn limits_are_enforced() {
        let too_many = (0..101).map(|_| inner_key_link()).collect();
        let result = Transaction::create_complete(Deadline::default(), too_many, NetworkType::TestNet, vec![], 0u64);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn max_fee_counts_required_cosignatures() {
        let tx = aggregate(vec![inner_key_link()]);
        let priced = tx.set_max_fee_for_aggregate(10, 2).unwrap();
        assert_eq!(
            priced.max_fee().value(),
            (tx.size() + 2 * COSIGNATURE_SIZE) as u64 * 10
        );

        let plain = TransactionBuilder::new(
            NetworkType::TestNet,
            TransactionBody::AccountKeyLink(KeyLinkBody::new(PublicKey::default(), LinkAction::Link)),
        )
        .build()
        .unwrap();
        assert!(matches!(
            plain.set_max_fee_for_aggregate(10, 1),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn add_helpers_derive_copies() {
        let tx = aggregate(vec![inner_key_link()]);
        let more = tx.add_transactions(vec![inner_transfer("z")]).unwrap();
        assert_eq!(tx.inner_transactions().len(), 1);
        assert_eq!(more.inner_transactions().len(), 2);

        let cosigned = more
            .add_cosignatures(vec![AggregateCosignature::new(PublicKey::from_bytes([3; 32]), crate::crypto::keys::Signature::from_bytes([0; 64]))])
            .unwrap();
        assert_eq!(cosigned.size(), more.size() + COSIGNATURE_SIZE);
        assert!(cosigned.signed_by_account(&PublicAccount::new(PublicKey::from_bytes([3; 32]), NetworkType::TestNet)));
    }

    #[test]
    fn derived_copies_keep_build_limits() {
        let cosignatures = |n: u8| -> Vec<AggregateCosignature> {
            (0..n)
                .map(|i| AggregateCosignature::new(PublicKey::from_bytes([i; 32]), crate::crypto::keys::Signature::from_bytes([0; 64])))
                .collect()
        };
        let limits = TransactionLimits {
            max_cosignatures_per_aggregate: 40,
            ..TransactionLimits::default()
        };
        let body = AggregateBody::new(AggregateKind::Complete, vec![inner_key_link()], vec![]);
        let wide = TransactionBuilder::new(NetworkType::TestNet, TransactionBody::Aggregate(body))
            .limits(limits)
            .build()
            .unwrap();
        assert_eq!(wide.limits(), &limits);

        let cosigned = wide.add_cosignatures(cosignatures(26)).unwrap();
        assert_eq!(cosigned.cosignatures().len(), 26);
        assert_eq!(cosigned.limits(), &limits);
        assert!(cosigned.add_cosignatures(cosignatures(15)).is_err());

        let default = aggregate(vec![inner_key_link()]);
        let err = default.add_cosignatures(cosignatures(26)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
        let raised = default.with_limits(limits).unwrap();
        assert!(raised.add_cosignatures(cosignatures(26)).is_ok());

        // Limits are construction policy, not part of the value.
        assert_eq!(raised, default);
        assert!(cosigned.with_limits(TransactionLimits::default()).is_err());
    }

    #[test]
    fn inner_parties_are_notified() {
        let tx = aggregate(vec![inner_key_link()]);
        assert!(tx.should_notify_account(&signer().address()));
        let linked = Address::from_public_key(&PublicKey::from_bytes([4; 32]), NetworkType::TestNet);
        assert!(tx.should_notify_account(&linked));
    }
}
