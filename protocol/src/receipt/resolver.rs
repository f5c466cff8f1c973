//! Picking the resolution entry that applied to a given transaction.
//!
//! Entries inside a statement are keyed by `(primary_id, secondary_id)`. A
//! transaction at position `(p, s)` sees the binding recorded by the latest
//! entry at or before that position:
//!
//! 1. Let `P` be the greatest entry `primary_id <= p`. No such entry means
//!    the alias was never resolved before this transaction.
//! 2. If `p > P`, the last entry under `P` applies.
//! 3. Otherwise let `S` be the greatest `secondary_id <= s` under `P`. If
//!    there is none and `s != 0`, the last entry of the previous primary
//!    applies.
//! 4. Otherwise the entry `(P, S)` applies, if it exists.

use tracing::trace;

use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::mosaic::MosaicId;
use crate::model::namespace::NamespaceId;
use crate::model::uint64::UInt64;
use crate::model::unresolved::{UnresolvedAddress, UnresolvedMosaicId};
use crate::receipt::statement::{ReceiptSource, ResolutionEntry, ResolutionStatement, Statement};

impl<R: Copy> ResolutionStatement<R> {
    /// The entry that applies to a transaction at `(primary_id, secondary_id)`.
    pub fn entry_for(&self, primary_id: u32, secondary_id: u32) -> Option<&ResolutionEntry<R>> {
        let resolved_primary = self.max_primary_at_most(primary_id);
        if resolved_primary == 0 {
            return None;
        }
        if primary_id > resolved_primary {
            return self.entry(resolved_primary, self.max_secondary(resolved_primary));
        }

        let resolved_secondary = self.max_secondary_at_most(resolved_primary, secondary_id);
        if resolved_secondary == 0 && secondary_id != 0 {
            let previous = self.max_primary_at_most(resolved_primary - 1);
            return self.entry(previous, self.max_secondary(previous));
        }
        self.entry(resolved_primary, resolved_secondary)
    }

    fn max_primary_at_most(&self, primary_id: u32) -> u32 {
        self.entries
            .iter()
            .map(|e| e.source.primary_id)
            .filter(|p| *p <= primary_id)
            .max()
            .unwrap_or(0)
    }

    fn max_secondary(&self, primary_id: u32) -> u32 {
        self.max_secondary_at_most(primary_id, u32::MAX)
    }

    fn max_secondary_at_most(&self, primary_id: u32, secondary_id: u32) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.source.primary_id == primary_id)
            .map(|e| e.source.secondary_id)
            .filter(|s| *s <= secondary_id)
            .max()
            .unwrap_or(0)
    }

    fn entry(&self, primary_id: u32, secondary_id: u32) -> Option<&ResolutionEntry<R>> {
        let source = ReceiptSource::new(primary_id, secondary_id);
        self.entries.iter().find(|e| e.source == source)
    }
}

fn lookup<R: Copy>(
    statements: &[ResolutionStatement<R>],
    alias: NamespaceId,
    height: UInt64,
    source: ReceiptSource,
) -> Result<R> {
    let statement = statements
        .iter()
        .find(|s| s.height == height && s.unresolved == alias)
        .ok_or_else(|| {
            Error::resolution_not_found(format!(
                "no resolution statement for alias {} at height {}",
                alias, height
            ))
        })?;
    statement
        .entry_for(source.primary_id, source.secondary_id)
        .map(|e| e.resolved)
        .ok_or_else(|| {
            Error::resolution_not_found(format!(
                "alias {} has no entry at or before ({}, {}) at height {}",
                alias, source.primary_id, source.secondary_id, height
            ))
        })
}

fn one_based(index: u32) -> Result<u32> {
    index
        .checked_add(1)
        .ok_or_else(|| Error::resolution_not_found(format!("index {} has no receipt source", index)))
}

/// A confirmed transaction's position, bound to the statement that covers
/// its block.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    statement: &'a Statement,
    height: UInt64,
    source: ReceiptSource,
}

impl<'a> ResolutionContext<'a> {
    /// Context of the top-level transaction at 0-based `index` in the block.
    ///
    /// Receipt sources are 1-based u32s, so `u32::MAX` has no source and
    /// nothing can have been resolved for it.
    pub fn new(statement: &'a Statement, height: UInt64, index: u32) -> Result<Self> {
        Ok(Self {
            statement,
            height,
            source: ReceiptSource::new(one_based(index)?, 0),
        })
    }

    /// Context of the inner transaction at 0-based `inner_index` of the
    /// aggregate this context belongs to.
    pub fn inner(&self, inner_index: usize) -> Result<Self> {
        let inner_index = u32::try_from(inner_index)
            .map_err(|_| Error::resolution_not_found(format!("inner index {} has no receipt source", inner_index)))?;
        Ok(Self {
            source: ReceiptSource::new(self.source.primary_id, one_based(inner_index)?),
            ..*self
        })
    }

    pub fn source(&self) -> ReceiptSource {
        self.source
    }

    pub fn height(&self) -> UInt64 {
        self.height
    }

    /// Canonical form of `address`. Canonical input is returned unchanged.
    pub fn address(&self, address: &UnresolvedAddress) -> Result<UnresolvedAddress> {
        let Some(alias) = address.as_alias() else {
            return Ok(*address);
        };
        let resolved: Address = lookup(
            &self.statement.address_resolution_statements,
            alias,
            self.height,
            self.source,
        )?;
        trace!(%alias, %resolved, height = %self.height, source = ?self.source, "resolved address alias");
        Ok(UnresolvedAddress::Address(resolved))
    }

    /// Canonical form of `mosaic_id`. Canonical input is returned unchanged.
    pub fn mosaic_id(&self, mosaic_id: &UnresolvedMosaicId) -> Result<UnresolvedMosaicId> {
        let Some(alias) = mosaic_id.as_alias() else {
            return Ok(*mosaic_id);
        };
        let resolved: MosaicId = lookup(
            &self.statement.mosaic_resolution_statements,
            alias,
            self.height,
            self.source,
        )?;
        trace!(%alias, %resolved, height = %self.height, source = ?self.source, "resolved mosaic alias");
        Ok(UnresolvedMosaicId::Mosaic(resolved))
    }

    pub fn addresses(&self, addresses: &[UnresolvedAddress]) -> Result<Vec<UnresolvedAddress>> {
        addresses.iter().map(|a| self.address(a)).collect()
    }

    pub fn mosaic_ids(&self, ids: &[UnresolvedMosaicId]) -> Result<Vec<UnresolvedMosaicId>> {
        ids.iter().map(|id| self.mosaic_id(id)).collect()
    }
}
