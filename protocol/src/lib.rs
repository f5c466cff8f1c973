// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # catapult-tx
//!
//! Client-side transaction toolkit for catapult ledgers: build a
//! transaction, encode it into the exact bytes a node expects, sign it for a
//! specific network, and read confirmed transactions back, with namespace
//! aliases resolved to what they pointed at when the block executed.
//!
//! Nothing here talks to a node. The crate is a pure codec: every operation
//! takes values and bytes in and hands values and bytes back, synchronously.
//!
//! ## Architecture
//!
//! - **config**: protocol constants and per-network parameters.
//! - **error**: the crate-wide [`Error`] and its four kinds.
//! - **crypto**: Ed25519 keys, hashes, message encryption.
//! - **model**: exact 64-bit values, networks, addresses, accounts, mosaic
//!   and namespace ids, alias-capable references, messages.
//! - **receipt**: block resolution statements and the alias resolver.
//! - **transaction**: the transaction types, their wire codec, aggregates,
//!   signing, verification and DTO decoding.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use catapult_tx::config::NetworkConfig;
//! use catapult_tx::model::{Account, Message, NetworkType};
//! use catapult_tx::transaction::{Deadline, DeadlineUnit, TransactionBody, TransactionBuilder, TransferBody};
//!
//! let network = NetworkConfig::testnet();
//! let sender = Account::generate(NetworkType::TestNet);
//! let recipient = Account::generate(NetworkType::TestNet).address();
//!
//! let body = TransactionBody::Transfer(TransferBody::new(recipient, vec![], Message::plain("hello")?));
//! let tx = TransactionBuilder::for_network(&network, body)
//!     .deadline(Deadline::create(network.epoch_adjustment, 2, DeadlineUnit::Hours)?)
//!     .build()?
//!     .set_max_fee(100);
//! let signed = tx.sign_with(&sender, &network.generation_hash_bytes()?)?;
//! println!("{} {}", signed.hash, signed.payload);
//! # Ok::<(), catapult_tx::Error>(())
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod receipt;
pub mod transaction;

pub use error::{Error, ErrorKind, Result};
