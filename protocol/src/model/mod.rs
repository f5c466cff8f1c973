//! # Ledger Value Types
//!
//! Everything a transaction body is built from: exact 64-bit values,
//! networks, addresses and accounts, namespace and mosaic identifiers, the
//! alias-capable references that can stand for either, and transfer
//! messages.

pub mod account;
pub mod address;
pub mod message;
pub mod mosaic;
pub mod namespace;
pub mod network;
pub mod uint64;
pub mod unresolved;

pub use account::{Account, PublicAccount};
pub use address::Address;
pub use message::{EncryptedMessage, Message, MessageType, PersistentHarvestingDelegationMessage};
pub use mosaic::{Mosaic, MosaicFlags, MosaicId, MosaicNonce};
pub use namespace::NamespaceId;
pub use network::NetworkType;
pub use uint64::UInt64;
pub use unresolved::{UnresolvedAddress, UnresolvedMosaicId};
