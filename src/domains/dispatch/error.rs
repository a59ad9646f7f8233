//! Dispatch error types.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// One offending field of a rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub problem: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

/// Errors that end a single dispatch.
///
/// `Display` carries the full detail for logs; callers only ever see
/// `public_message` (plus the field list for validation failures).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler with this name in the current snapshot.
    #[error("Handler not found: {0}")]
    NotFound(String),

    /// The payload does not match the handler's parameters.
    #[error("Validation failed for '{handler}': {} offending field(s)", fields.len())]
    ValidationFailed {
        handler: String,
        fields: Vec<FieldIssue>,
    },

    /// The handler ran and failed, or produced an unusable response.
    #[error("Handler '{handler}' failed: {reason}")]
    HandlerFailed { handler: String, reason: String },

    /// The handler did not finish within its timeout.
    #[error("Handler '{handler}' timed out after {timeout:?}")]
    TimedOut { handler: String, timeout: Duration },
}

impl DispatchError {
    /// Create a new "validation failed" error.
    pub fn validation_failed(handler: impl Into<String>, fields: Vec<FieldIssue>) -> Self {
        Self::ValidationFailed {
            handler: handler.into(),
            fields,
        }
    }

    /// Create a new "handler failed" error.
    pub fn handler_failed(handler: impl Into<String>, reason: impl ToString) -> Self {
        Self::HandlerFailed {
            handler: handler.into(),
            reason: reason.to_string(),
        }
    }

    /// The message returned to callers.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Handler not found",
            Self::ValidationFailed { .. } => "Validation failed",
            Self::HandlerFailed { .. } | Self::TimedOut { .. } => "Handler failed",
        }
    }

    /// Offending fields, for validation failures.
    pub fn fields(&self) -> Option<&[FieldIssue]> {
        match self {
            Self::ValidationFailed { fields, .. } => Some(fields),
            _ => None,
        }
    }
}
