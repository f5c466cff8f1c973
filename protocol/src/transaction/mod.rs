//! # Transaction Module
//!
//! Construction, encoding, signing, decoding and alias resolution for every
//! transaction type the ledger accepts.
//!
//! ## Architecture
//!
//! ```text
//! types.rs          wire enums (TransactionType, LinkAction, restriction flags, ...)
//! codec.rs          little-endian Reader / Writer
//! header.rs         standalone and embedded headers, TransactionInfo
//! deadline.rs       Deadline and its policy window
//! body.rs           TransactionBody sum type and the BodyCodec trait
//! transfer.rs ..    one file per body family
//! builder.rs        Transaction, InnerTransaction, TransactionBuilder
//! aggregate.rs      aggregate bodies and helpers
//! cosignature.rs    inline and detached cosignatures
//! signing.rs        signing data, transaction hash, SignedTransaction
//! verification.rs   signature and hash checks of signed payloads
//! mapping.rs        payload decoding
//! dto.rs            REST JSON decoding
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: pick a [`TransactionBody`] and run it through
//!    [`TransactionBuilder`], or [`Transaction::create_complete`] /
//!    [`Transaction::create_bonded`] for aggregates.
//! 2. **Sign**: [`Transaction::sign_with`] with the network's generation
//!    hash yields a [`SignedTransaction`] (payload and hash, both hex).
//! 3. **Announce**: the payload goes to a node; that is not this crate's job.
//! 4. **Read back**: [`Transaction::from_payload`] or
//!    [`Transaction::from_dto`] decode what the node returns.
//! 5. **Resolve**: [`Transaction::resolve_aliases`] swaps namespace aliases
//!    for what they pointed at when the block executed.
//!
//! ## Design Decisions
//!
//! - One closed enum of bodies, dispatched on `(type, version)`. Adding a
//!   transaction type is a compile error everywhere it matters.
//! - Transactions are values. Every "setter" returns a derived copy.
//! - `size()` is computed from the body, never from a serialized buffer, and
//!   always equals the serialized length.

pub mod aggregate;
pub mod body;
pub mod builder;
pub mod codec;
pub mod cosignature;
pub mod deadline;
pub mod dto;
pub mod header;
pub mod key_link;
pub mod lock;
pub mod mapping;
pub mod metadata;
pub mod mosaic;
pub mod multisig;
pub mod namespace;
pub mod restriction;
pub mod signing;
pub mod transfer;
pub mod types;
pub mod verification;

pub use aggregate::{AggregateBody, AggregateKind};
pub use body::{BodyCodec, TransactionBody};
pub use builder::{InnerTransaction, Transaction, TransactionBuilder};
pub use cosignature::{AggregateCosignature, CosignatureSignedTransaction, CosignatureTransaction};
pub use deadline::{Deadline, DeadlineUnit};
pub use dto::TransactionDto;
pub use header::TransactionInfo;
pub use key_link::{KeyLinkBody, VotingKey, VotingKeyLinkBody};
pub use lock::{HashLockBody, SecretLockBody, SecretProofBody};
pub use mapping::{create_from_payload, DecodedTransaction};
pub use metadata::{
    metadata_key, AccountMetadataBody, MetadataValue, MosaicMetadataBody, NamespaceMetadataBody,
};
pub use mosaic::{MosaicDefinitionBody, MosaicSupplyChangeBody, MosaicSupplyRevocationBody};
pub use multisig::MultisigAccountModificationBody;
pub use namespace::{AddressAliasBody, MosaicAliasBody, NamespaceRegistration, NamespaceRegistrationBody};
pub use restriction::{
    AccountAddressRestrictionBody, AccountMosaicRestrictionBody, AccountOperationRestrictionBody,
    AccountRestrictionBody, MosaicAddressRestrictionBody, MosaicGlobalRestrictionBody,
};
pub use signing::{signing_data, transaction_hash, SignedTransaction};
pub use transfer::TransferBody;
pub use types::{
    AddressRestrictionFlag, AliasAction, LinkAction, LockHashAlgorithm, MosaicRestrictionFlag,
    MosaicRestrictionType, MosaicSupplyChangeAction, NamespaceRegistrationType,
    OperationRestrictionFlag, TransactionType,
};
pub use verification::{verify_cosignatures, verify_signed_transaction, VerificationError};
