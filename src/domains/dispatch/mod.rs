//! Dispatch domain.
//!
//! Resolves a handler name against the current registry snapshot, validates
//! the payload against the handler's extracted parameters, runs the handler
//! and checks its response against the declared return type.
//!
//! Status mapping lives in the HTTP transport; here every outcome is a
//! `Result<Value, DispatchError>`.

mod error;
mod invoke;
mod validate;

pub use error::{DispatchError, FieldIssue};
pub use invoke::invoke;
pub use validate::{parse_body, validate};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::domains::registry::HandlerRegistry;

/// Routes requests to handlers of the live registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    default_timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher. `default_timeout` applies to handlers whose
    /// manifest sets none.
    pub fn new(registry: Arc<HandlerRegistry>, default_timeout: Duration) -> Self {
        Self {
            registry,
            default_timeout,
        }
    }

    /// The registry requests are resolved against.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Dispatch a raw request body to the named handler.
    ///
    /// The handler runs in its own task: if the caller stops waiting, the
    /// invocation still completes and its result is dropped.
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub async fn dispatch(&self, name: &str, body: &[u8]) -> Result<Value, DispatchError> {
        let result = self.dispatch_inner(name, body).await;

        match &result {
            Ok(_) => info!("Handler {} succeeded", name),
            Err(e) => match e {
                DispatchError::NotFound(_) => warn!("{}", e),
                DispatchError::ValidationFailed { fields, .. } => info!(?fields, "{}", e),
                _ => error!("{}", e),
            },
        }

        result
    }

    async fn dispatch_inner(&self, name: &str, body: &[u8]) -> Result<Value, DispatchError> {
        // One snapshot for the whole request.
        let snapshot = self.registry.snapshot();

        let handler = snapshot
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))?;

        let payload =
            parse_body(body).map_err(|fields| DispatchError::validation_failed(name, fields))?;
        validate(&handler.description.parameters, &payload)
            .map_err(|fields| DispatchError::validation_failed(name, fields))?;

        let timeout = handler.timeout.unwrap_or(self.default_timeout);
        let task = tokio::spawn(invoke(handler.clone(), payload, timeout));

        let response = task
            .await
            .map_err(|e| DispatchError::handler_failed(name, e))??;

        validate(&handler.description.returns, &response).map_err(|fields| {
            DispatchError::handler_failed(
                name,
                format!("response does not match its declared type: {fields:?}"),
            )
        })?;

        Ok(response)
    }
}
