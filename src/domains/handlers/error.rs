//! Handler-specific error types.

use thiserror::Error;

/// Errors a handler body may return from `invoke`.
///
/// These never reach callers verbatim: the dispatch layer logs them and
/// answers with an opaque failure.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request decoded fine but its values cannot be processed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The handler failed while doing its work.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl HandlerError {
    /// Create a new "invalid input" error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }
}

/// Errors produced while calling a type-erased handler with raw JSON.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The payload could not be decoded into the handler's request type.
    ///
    /// `field` is the path of the offending value (`matrix1[0][0]`), or `.`
    /// when the request object itself is at fault.
    #[error("Request decoding failed at {field}: {source}")]
    Decode {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// The handler itself returned an error.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// The handler's response could not be encoded as JSON.
    #[error("Response encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<serde_path_to_error::Error<serde_json::Error>> for InvokeError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self::Decode {
            field: err.path().to_string(),
            source: err.into_inner(),
        }
    }
}
