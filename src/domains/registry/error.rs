//! Registry-specific error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::domains::schema::ExtractionError;

/// Errors that abort a registry load.
///
/// A load either yields a complete snapshot or one of these; there is no
/// partially loaded registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A source unit does not satisfy the handler contract.
    #[error("Invalid handler '{name}': {reason}")]
    InvalidHandler { name: String, reason: String },

    /// Two source units resolve to the same handler name.
    #[error("Duplicate handler name '{name}': {} and {}", first.display(), second.display())]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Reading the handler directory or a source unit failed.
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A handler's declaration could not be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl RegistryError {
    /// Create a new "invalid handler" error.
    pub fn invalid_handler(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHandler {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
