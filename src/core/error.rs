//! Error types and handling for the gateway.
//!
//! This module defines a unified error type that can represent errors from
//! all domains and external dependencies.

use thiserror::Error;

/// A specialized Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from schema extraction.
    #[error("Extraction error: {0}")]
    Extraction(#[from] crate::domains::schema::ExtractionError),

    /// Error originating from the handler registry.
    #[error("Registry error: {0}")]
    Registry(#[from] crate::domains::registry::RegistryError),

    /// Error originating from the HTTP transport.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
