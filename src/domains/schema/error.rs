//! Extraction error types.

use thiserror::Error;

/// Errors that can occur while extracting a function description.
///
/// Every variant names the offending handler, and the field where one is
/// involved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// The handler has no documentation and no fallback is configured.
    #[error("Handler '{handler}' has no description")]
    MissingDescription { handler: String },

    /// A field declares a type outside the primitive lookup table.
    #[error("Handler '{handler}': field '{field}' has unsupported type '{declared}'")]
    UnsupportedType {
        handler: String,
        field: String,
        declared: String,
    },

    /// Two descriptions resolve to the same name.
    #[error("Duplicate function name in catalog: {name}")]
    DuplicateName { name: String },
}

impl ExtractionError {
    /// Create a new "missing description" error.
    pub fn missing_description(handler: impl Into<String>) -> Self {
        Self::MissingDescription {
            handler: handler.into(),
        }
    }

    /// Create a new "unsupported type" error.
    pub fn unsupported_type(
        handler: impl Into<String>,
        field: impl Into<String>,
        declared: impl Into<String>,
    ) -> Self {
        Self::UnsupportedType {
            handler: handler.into(),
            field: field.into(),
            declared: declared.into(),
        }
    }
}
