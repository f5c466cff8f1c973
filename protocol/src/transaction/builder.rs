//! Transactions and their construction.
//!
//! A [`Transaction`] is the standalone form: shared header fields plus one
//! [`TransactionBody`]. An [`InnerTransaction`] is the same body wrapped for
//! inclusion in an aggregate, carrying a declared signer instead of a
//! deadline, fee and signature.
//!
//! Both are value objects. Nothing here mutates a transaction after it is
//! built; [`Transaction::set_max_fee`], [`Transaction::resolve_aliases`] and
//! friends return derived copies.
//!
//! The [`TransactionBuilder`] enforces a disciplined construction flow:
//! choose a network and a body, optionally set deadline and fee, call
//! `.build()`. Build-time validation (address networks, message and
//! aggregate limits, field ranges) happens there and nowhere else, so a
//! `Transaction` in hand is always encodable.

use crate::config::{NetworkConfig, TransactionLimits, EMBEDDED_HEADER_SIZE, TRANSACTION_HEADER_SIZE};
use crate::crypto::hash::sha3_256;
use crate::crypto::keys::{PublicKey, Signature};
use crate::error::{Error, Result};
use crate::model::account::PublicAccount;
use crate::model::address::Address;
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::receipt::resolver::ResolutionContext;
use crate::receipt::statement::Statement;
use crate::transaction::body::TransactionBody;
use crate::transaction::codec::Writer;
use crate::transaction::deadline::Deadline;
use crate::transaction::header::{EmbeddedHeader, StandaloneHeader, TransactionInfo};
use crate::transaction::types::TransactionType;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A standalone transaction.
///
/// `signature` and `signer` are `None` until the transaction is signed, or
/// when a decoded payload carried all-zero slots. `info` is only present on
/// transactions that came back from a node. `limits` are the ones the body
/// was validated against; derived copies are checked against them again and
/// they take no part in equality.
#[derive(Debug, Clone)]
pub struct Transaction {
    network_type: NetworkType,
    deadline: Deadline,
    max_fee: UInt64,
    signature: Option<Signature>,
    signer: Option<PublicKey>,
    info: Option<TransactionInfo>,
    body: TransactionBody,
    limits: TransactionLimits,
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.network_type == other.network_type
            && self.deadline == other.deadline
            && self.max_fee == other.max_fee
            && self.signature == other.signature
            && self.signer == other.signer
            && self.info == other.info
            && self.body == other.body
    }
}

impl Eq for Transaction {}

impl Transaction {
    pub(crate) fn from_parts(
        network_type: NetworkType,
        deadline: Deadline,
        max_fee: UInt64,
        signature: Option<Signature>,
        signer: Option<PublicKey>,
        body: TransactionBody,
    ) -> Self {
        Self {
            network_type,
            deadline,
            max_fee,
            signature,
            signer,
            info: None,
            body,
            limits: TransactionLimits::default(),
        }
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub fn max_fee(&self) -> UInt64 {
        self.max_fee
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn signer(&self) -> Option<&PublicKey> {
        self.signer.as_ref()
    }

    /// The signer as an account on this transaction's network.
    pub fn signer_account(&self) -> Option<PublicAccount> {
        self.signer.map(|key| PublicAccount::new(key, self.network_type))
    }

    pub fn info(&self) -> Option<&TransactionInfo> {
        self.info.as_ref()
    }

    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn limits(&self) -> &TransactionLimits {
        &self.limits
    }

    /// Copy validated against, and carrying, `limits`.
    pub fn with_limits(&self, limits: TransactionLimits) -> Result<Self> {
        self.body.validate(self.network_type, &limits)?;
        Ok(Self {
            limits,
            ..self.clone()
        })
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.body.transaction_type()
    }

    pub fn version(&self) -> u8 {
        self.body.version()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// `true` once the transaction has been included in a block.
    pub fn is_confirmed(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.height.value() > 0)
    }

    /// Copy carrying on-chain metadata.
    pub fn with_info(&self, info: TransactionInfo) -> Self {
        Self {
            info: Some(info),
            ..self.clone()
        }
    }

    pub(crate) fn with_body(&self, body: TransactionBody) -> Self {
        Self {
            body,
            ..self.clone()
        }
    }

    pub(crate) fn with_signature(&self, signer: PublicKey, signature: Signature) -> Self {
        Self {
            signer: Some(signer),
            signature: Some(signature),
            ..self.clone()
        }
    }

    /// Copy with an explicit fee.
    pub fn with_max_fee(&self, max_fee: impl Into<UInt64>) -> Self {
        Self {
            max_fee: max_fee.into(),
            ..self.clone()
        }
    }

    /// Copy whose fee is `size() * multiplier`.
    pub fn set_max_fee(&self, multiplier: u32) -> Self {
        self.with_max_fee(self.size() as u64 * u64::from(multiplier))
    }

    /// Encoded length in bytes; always equals `serialize().len()`.
    pub fn size(&self) -> usize {
        TRANSACTION_HEADER_SIZE + self.body.size()
    }

    /// Standalone wire form. Unsigned slots are zero-filled.
    pub fn serialize(&self) -> Vec<u8> {
        let size = self.size();
        let mut w = Writer::with_capacity(size);
        StandaloneHeader {
            size: size as u32,
            signature: self.signature,
            signer: self.signer,
            version: self.version(),
            network_type: self.network_type,
            transaction_type: self.transaction_type(),
            max_fee: self.max_fee,
            deadline: self.deadline.adjusted_value(),
        }
        .write(&mut w);
        self.body.write(&mut w, self.network_type);
        debug_assert_eq!(w.len(), size);
        w.into_vec()
    }

    /// Uppercase hex of [`Transaction::serialize`].
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.serialize())
    }

    /// Wraps this transaction for an aggregate, declaring `signer` as the
    /// account that authorizes it.
    pub fn to_aggregate(&self, signer: &PublicAccount) -> Result<InnerTransaction> {
        if self.transaction_type().is_aggregate() {
            return Err(Error::invalid_argument(
                "an aggregate cannot be embedded in another aggregate",
            ));
        }
        if signer.network_type != self.network_type {
            return Err(Error::invalid_argument(format!(
                "signer is on {}, transaction targets {}",
                signer.network_type, self.network_type
            )));
        }
        Ok(InnerTransaction {
            signer: signer.public_key,
            network_type: self.network_type,
            body: self.body.clone(),
            info: None,
        })
    }

    /// Copy with every alias replaced by the value recorded in
    /// `statement`.
    ///
    /// Transactions without alias fields come back unchanged. Otherwise the
    /// transaction must carry its confirmation info, which fixes the block
    /// height and position the aliases are resolved at.
    pub fn resolve_aliases(&self, statement: &Statement) -> Result<Self> {
        if !self.body.has_aliases() {
            return Ok(self.clone());
        }
        let info = self.info.as_ref().ok_or_else(|| {
            Error::resolution_not_found(format!(
                "{} has aliases but was never confirmed",
                self.transaction_type()
            ))
        })?;
        let ctx = ResolutionContext::new(statement, info.height, info.index)?;
        Ok(self.with_body(self.body.resolve(&ctx)?))
    }

    /// `true` when `address` signed this transaction or is one of its
    /// interested parties.
    pub fn should_notify_account(&self, address: &Address) -> bool {
        self.should_notify_account_with_aliases(address, &[])
    }

    /// Like [`Transaction::should_notify_account`], also matching alias
    /// fields that point at one of `aliases`.
    pub fn should_notify_account_with_aliases(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        let signed_by = self
            .signer
            .is_some_and(|key| Address::from_public_key(&key, address.network_type()) == *address);
        signed_by || self.body.notifies(address, aliases)
    }
}

// ---------------------------------------------------------------------------
// InnerTransaction
// ---------------------------------------------------------------------------

/// A transaction embedded in an aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerTransaction {
    pub(crate) signer: PublicKey,
    pub(crate) network_type: NetworkType,
    pub(crate) body: TransactionBody,
    pub(crate) info: Option<TransactionInfo>,
}

impl InnerTransaction {
    pub fn signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn signer_account(&self) -> PublicAccount {
        PublicAccount::new(self.signer, self.network_type)
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn info(&self) -> Option<&TransactionInfo> {
        self.info.as_ref()
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.body.transaction_type()
    }

    pub fn version(&self) -> u8 {
        self.body.version()
    }

    /// Encoded length without the alignment padding the aggregate adds.
    pub fn size(&self) -> usize {
        EMBEDDED_HEADER_SIZE + self.body.size()
    }

    /// Embedded wire form.
    pub fn serialize_embedded(&self) -> Vec<u8> {
        let size = self.size();
        let mut w = Writer::with_capacity(size);
        EmbeddedHeader {
            size: size as u32,
            signer: self.signer,
            version: self.version(),
            network_type: self.network_type,
            transaction_type: self.transaction_type(),
        }
        .write(&mut w);
        self.body.write(&mut w, self.network_type);
        debug_assert_eq!(w.len(), size);
        w.into_vec()
    }

    /// SHA3-256 of the embedded form; the leaves of an aggregate's
    /// transactions hash.
    pub fn hash(&self) -> [u8; 32] {
        sha3_256(&self.serialize_embedded())
    }

    pub(crate) fn with_info(mut self, info: TransactionInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub(crate) fn validate(&self, network_type: NetworkType, limits: &TransactionLimits) -> Result<()> {
        if self.network_type != network_type {
            return Err(Error::invalid_argument(format!(
                "inner {} targets {}, aggregate targets {}",
                self.transaction_type(),
                self.network_type,
                network_type
            )));
        }
        if self.transaction_type().is_aggregate() {
            return Err(Error::invalid_argument(
                "an aggregate cannot be embedded in another aggregate",
            ));
        }
        self.body.validate(network_type, limits)
    }

    /// Copy with every alias replaced by the value recorded in `statement`.
    ///
    /// `info.index` is this transaction's position inside its aggregate and
    /// `aggregate_index` the aggregate's position in the block, both 0-based.
    /// Transactions without alias fields come back unchanged.
    pub fn resolve_aliases(&self, statement: &Statement, aggregate_index: u32) -> Result<Self> {
        if !self.body.has_aliases() {
            return Ok(self.clone());
        }
        let info = self.info.as_ref().ok_or_else(|| {
            Error::resolution_not_found(format!(
                "embedded {} has aliases but was never confirmed",
                self.transaction_type()
            ))
        })?;
        let ctx = ResolutionContext::new(statement, info.height, aggregate_index)?.inner(info.index as usize)?;
        self.resolve(&ctx)
    }

    pub(crate) fn resolve(&self, ctx: &ResolutionContext<'_>) -> Result<Self> {
        Ok(Self {
            body: self.body.resolve(ctx)?,
            ..self.clone()
        })
    }

    pub(crate) fn notifies(&self, address: &Address, aliases: &[NamespaceId]) -> bool {
        Address::from_public_key(&self.signer, address.network_type()) == *address
            || self.body.notifies(address, aliases)
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// ```rust,no_run
/// use catapult_tx::config::NetworkConfig;
/// use catapult_tx::crypto::PublicKey;
/// use catapult_tx::transaction::{KeyLinkBody, LinkAction, TransactionBody, TransactionBuilder};
/// use catapult_tx::transaction::deadline::{Deadline, DeadlineUnit};
///
/// let network = NetworkConfig::testnet();
/// let body = TransactionBody::AccountKeyLink(KeyLinkBody::new(PublicKey::default(), LinkAction::Link));
/// let tx = TransactionBuilder::for_network(&network, body)
///     .deadline(Deadline::create(network.epoch_adjustment, 2, DeadlineUnit::Hours)?)
///     .max_fee(1_000_000u64)
///     .build()?;
/// # Ok::<(), catapult_tx::Error>(())
/// ```
///
/// Defaults: zero deadline, zero fee, the public network limits.
pub struct TransactionBuilder {
    network_type: NetworkType,
    limits: TransactionLimits,
    deadline: Deadline,
    max_fee: UInt64,
    body: TransactionBody,
}

impl TransactionBuilder {
    pub fn new(network_type: NetworkType, body: TransactionBody) -> Self {
        Self {
            network_type,
            limits: TransactionLimits::default(),
            deadline: Deadline::default(),
            max_fee: UInt64::ZERO,
            body,
        }
    }

    /// Builder using `config`'s network type and limits.
    pub fn for_network(config: &NetworkConfig, body: TransactionBody) -> Self {
        Self {
            limits: config.limits(),
            ..Self::new(config.network_type, body)
        }
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn max_fee(mut self, max_fee: impl Into<UInt64>) -> Self {
        self.max_fee = max_fee.into();
        self
    }

    pub fn limits(mut self, limits: TransactionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Validates the body and produces an unsigned transaction.
    pub fn build(self) -> Result<Transaction> {
        self.body.validate(self.network_type, &self.limits)?;
        Ok(Transaction {
            limits: self.limits,
            ..Transaction::from_parts(self.network_type, self.deadline, self.max_fee, None, None, self.body)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
