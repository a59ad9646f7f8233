//! Schema domain module.
//!
//! Derives agent-consumable function descriptions from handler declarations
//! without executing any handler.
//!
//! ## Architecture
//!
//! - `declaration.rs` - Raw declarations (manifest tables or `schemars` schemas)
//! - `extractor.rs` - Normalization: primitive lookup, optionality, descriptions
//! - `types.rs` - `FieldSchema`, `ObjectSchema`, `FunctionDescription`
//! - `catalog.rs` - The ordered catalog and its JSON file
//! - `error.rs` - Extraction error types

mod catalog;
mod declaration;
mod error;
mod extractor;
mod types;

pub use catalog::Catalog;
pub use declaration::{DeclaredField, HandlerDeclaration, ROOT_FIELD, TypeDeclaration};
pub use error::ExtractionError;
pub use extractor::{
    ExtractOptions, PLACEHOLDER_DESCRIPTION, extract, resolve_primitive, strip_optional,
};
pub use types::{FieldSchema, FunctionDescription, ItemSchema, ObjectSchema, Primitive};
