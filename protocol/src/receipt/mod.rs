//! Receipt statements and alias resolution.

pub mod resolver;
pub mod statement;

pub use resolver::ResolutionContext;
pub use statement::{
    AddressResolutionStatement, MosaicResolutionStatement, ReceiptSource, ResolutionEntry,
    ResolutionStatement, Statement, StatementDto,
};
