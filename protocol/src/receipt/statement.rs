//! Block resolution statements.
//!
//! When a block executes a transaction that references a namespace alias, the
//! node records what the alias pointed to at that moment. A
//! [`ResolutionStatement`] collects those records for one alias at one block
//! height, each tagged with the position of the transaction that triggered it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::mosaic::MosaicId;
use crate::model::namespace::NamespaceId;
use crate::model::uint64::UInt64;
use crate::model::unresolved::{UnresolvedAddress, UnresolvedMosaicId};

/// Position of the transaction that produced a receipt.
///
/// `primary_id` is the 1-based index of the top-level transaction in its
/// block. `secondary_id` is the 1-based index inside an aggregate, or 0 for
/// a top-level transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSource {
    pub primary_id: u32,
    pub secondary_id: u32,
}

impl ReceiptSource {
    pub fn new(primary_id: u32, secondary_id: u32) -> Self {
        Self {
            primary_id,
            secondary_id,
        }
    }
}

/// One recorded resolution of an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionEntry<R> {
    pub resolved: R,
    pub source: ReceiptSource,
}

impl<R> ResolutionEntry<R> {
    pub fn new(resolved: R, source: ReceiptSource) -> Self {
        Self { resolved, source }
    }
}

/// Every resolution of one alias within one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionStatement<R> {
    pub height: UInt64,
    pub unresolved: NamespaceId,
    pub entries: Vec<ResolutionEntry<R>>,
}

impl<R> ResolutionStatement<R> {
    pub fn new(height: UInt64, unresolved: NamespaceId, entries: Vec<ResolutionEntry<R>>) -> Self {
        Self {
            height,
            unresolved,
            entries,
        }
    }
}

pub type AddressResolutionStatement = ResolutionStatement<Address>;
pub type MosaicResolutionStatement = ResolutionStatement<MosaicId>;

/// Resolution statements of one or more blocks, as fetched from a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    pub address_resolution_statements: Vec<AddressResolutionStatement>,
    pub mosaic_resolution_statements: Vec<MosaicResolutionStatement>,
}

impl Statement {
    pub fn new(
        address_resolution_statements: Vec<AddressResolutionStatement>,
        mosaic_resolution_statements: Vec<MosaicResolutionStatement>,
    ) -> Self {
        Self {
            address_resolution_statements,
            mosaic_resolution_statements,
        }
    }

    /// Builds a statement from the node's REST representation.
    pub fn from_dto(dto: &StatementDto) -> Result<Self> {
        let addresses = dto
            .address_resolution_statements
            .iter()
            .map(address_statement_from_dto)
            .collect::<Result<Vec<_>>>()?;
        let mosaics = dto
            .mosaic_resolution_statements
            .iter()
            .map(mosaic_statement_from_dto)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(addresses, mosaics))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dto: StatementDto = serde_json::from_str(json)
            .map_err(|e| Error::invalid_format(format!("statement: {}", e)))?;
        Self::from_dto(&dto)
    }
}

// ---------------------------------------------------------------------------
// REST representation
// ---------------------------------------------------------------------------

/// Both statement lists. Each element may be the bare statement or the
/// `{ "statement": ... }` envelope the paginated endpoints return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementDto {
    #[serde(default)]
    pub address_resolution_statements: Vec<ResolutionStatementEnvelope>,
    #[serde(default)]
    pub mosaic_resolution_statements: Vec<ResolutionStatementEnvelope>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolutionStatementEnvelope {
    Wrapped { statement: ResolutionStatementDto },
    Bare(ResolutionStatementDto),
}

impl ResolutionStatementEnvelope {
    fn statement(&self) -> &ResolutionStatementDto {
        match self {
            Self::Wrapped { statement } => statement,
            Self::Bare(statement) => statement,
        }
    }
}

/// `unresolved` and `resolved` are hex: an encoded 24-byte address for
/// address statements, a 16-character id for mosaic statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionStatementDto {
    pub height: UInt64,
    pub unresolved: String,
    pub resolution_entries: Vec<ResolutionEntryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionEntryDto {
    pub source: ReceiptSource,
    pub resolved: String,
}

fn address_statement_from_dto(
    envelope: &ResolutionStatementEnvelope,
) -> Result<AddressResolutionStatement> {
    let dto = envelope.statement();
    let unresolved = UnresolvedAddress::from_encoded(&dto.unresolved)
        .map_err(|e| Error::invalid_format(e.to_string()))?
        .as_alias()
        .ok_or_else(|| {
            Error::invalid_format(format!("address statement key {} is not an alias", dto.unresolved))
        })?;
    let entries = dto
        .resolution_entries
        .iter()
        .map(|e| {
            let resolved = Address::from_encoded(&e.resolved)
                .map_err(|err| Error::invalid_format(err.to_string()))?;
            Ok(ResolutionEntry::new(resolved, e.source))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ResolutionStatement::new(dto.height, unresolved, entries))
}

fn mosaic_statement_from_dto(
    envelope: &ResolutionStatementEnvelope,
) -> Result<MosaicResolutionStatement> {
    let dto = envelope.statement();
    let unresolved = UnresolvedMosaicId::from_hex(&dto.unresolved)
        .map_err(|e| Error::invalid_format(e.to_string()))?
        .as_alias()
        .ok_or_else(|| {
            Error::invalid_format(format!("mosaic statement key {} is not an alias", dto.unresolved))
        })?;
    let entries = dto
        .resolution_entries
        .iter()
        .map(|e| {
            let resolved = MosaicId::from_hex(&e.resolved)
                .map_err(|err| Error::invalid_format(err.to_string()))?;
            Ok(ResolutionEntry::new(resolved, e.source))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ResolutionStatement::new(dto.height, unresolved, entries))
}
