//! Mapping language (LM) front end
//!
//! Parses LM source text into a [`LogicalModel`]:
//! - `VALUEMAP` code tables
//! - `DATA` declarations mapping one backend object to one schema class
//! - `INSPECTION` declarations whose class and structural role are chosen per row

mod error;
mod lexer;
pub mod model;
mod parser;

pub use error::{Location, ParseError, ParseResult};
pub use model::{
    AliasDeclaration, CLASS_MARKER, ColumnMapping, ConversionCall, DataDeclaration,
    IDENT_MARKER, InspectionDeclaration, JoinDeclaration, LogicalModel, MappingDirection,
    NestingDeclaration, PARENT_MARKER, PASS_THROUGH_SENTINEL, STRUCT_ATTR_MARKER, ValueMap,
    WithBlock,
};
pub use parser::LmParser;
