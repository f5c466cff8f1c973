//! Namespace identifiers.
//!
//! A namespace id is derived from its name and its parent's id:
//! `SHA3-256(parent_id as u64 LE || name)`, first eight bytes read little
//! endian, with the high bit forced on. The high bit is what tells a
//! namespace alias apart from a real mosaic id when both travel in the same
//! 64-bit field.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::MAX_NAMESPACE_NAME_LENGTH;
use crate::crypto::hash::sha3_256_multi;
use crate::error::{Error, Result};
use crate::model::uint64::UInt64;

/// Bit that marks an id as a namespace id.
pub const NAMESPACE_FLAG: u64 = 1 << 63;

/// Deepest allowed namespace path (`root.sub.leaf`).
pub const MAX_NAMESPACE_DEPTH: usize = 3;

/// A 64-bit namespace identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceId(UInt64);

impl NamespaceId {
    pub const fn new(id: u64) -> Self {
        Self(UInt64::new(id))
    }

    /// Id of the last part of a dotted name, e.g. `"symbol.xym"`.
    pub fn from_name(name: &str) -> Result<Self> {
        let path = generate_namespace_path(name)?;
        path.last()
            .copied()
            .ok_or_else(|| Error::invalid_argument("namespace name is empty"))
    }

    /// Id of `name` registered directly under `parent`.
    pub fn child_of(parent: NamespaceId, name: &str) -> Result<Self> {
        validate_part(name)?;
        Ok(Self::derive(parent.value(), name))
    }

    pub fn from_hex(input: &str) -> Result<Self> {
        UInt64::from_hex(input).map(Self)
    }

    fn derive(parent: u64, name: &str) -> Self {
        let digest = sha3_256_multi(&[&parent.to_le_bytes(), name.as_bytes()]);
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        Self::new(u64::from_le_bytes(word) | NAMESPACE_FLAG)
    }

    pub fn id(self) -> UInt64 {
        self.0
    }

    pub fn value(self) -> u64 {
        self.0.value()
    }

    pub fn to_hex(self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Ids of every level of a dotted name, root first.
pub fn generate_namespace_path(name: &str) -> Result<Vec<NamespaceId>> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > MAX_NAMESPACE_DEPTH {
        return Err(Error::invalid_argument(format!(
            "namespace '{}' is deeper than {} levels",
            name, MAX_NAMESPACE_DEPTH
        )));
    }

    let mut parent = 0u64;
    let mut path = Vec::with_capacity(parts.len());
    for part in parts {
        validate_part(part)?;
        let id = NamespaceId::derive(parent, part);
        parent = id.value();
        path.push(id);
    }
    Ok(path)
}

/// A name part is 1..=64 characters of `a-z`, `0-9`, `_` and `-`, and must
/// start with a letter or digit.
pub(crate) fn validate_part(part: &str) -> Result<()> {
    let valid_chars = part
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    let valid_start = part
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    if !valid_chars || !valid_start || part.len() > MAX_NAMESPACE_NAME_LENGTH {
        return Err(Error::invalid_argument(format!(
            "invalid namespace name part '{}'",
            part
        )));
    }
    Ok(())
}
