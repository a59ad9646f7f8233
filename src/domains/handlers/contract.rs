//! The handler contract.
//!
//! A handler is a request type, a response type and one `invoke` function.
//! Both types derive `JsonSchema`, which is how the schema extractor reads
//! their shape without running any handler code.

use schemars::{JsonSchema, Schema, schema_for};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::error::{HandlerError, InvokeError};

/// Trait implemented by every compiled handler.
///
/// `invoke` must be a pure transformation from request to response; any work
/// that needs external resources happens inside it, per request.
pub trait Handler: Send + Sync + 'static {
    /// Key manifests use to bind this handler (`[invoke] builtin = "..."`).
    const NAME: &'static str;

    /// Documentation exported as the function description.
    const DESCRIPTION: &'static str;

    /// Declared request shape.
    type Request: DeserializeOwned + JsonSchema;

    /// Declared response shape.
    type Response: Serialize + JsonSchema;

    /// Transform a decoded request into a response.
    fn invoke(&self, request: Self::Request) -> Result<Self::Response, HandlerError>;
}

/// Object-safe view of a [`Handler`], as stored in the plugin table.
pub trait ErasedHandler: Send + Sync {
    /// The plugin key.
    fn name(&self) -> &'static str;

    /// The handler's own documentation.
    fn description(&self) -> &'static str;

    /// JSON schema of the request type.
    fn request_schema(&self) -> Schema;

    /// JSON schema of the response type.
    fn response_schema(&self) -> Schema;

    /// Decode `request`, invoke the handler and encode its response.
    fn call(&self, request: Value) -> Result<Value, InvokeError>;
}

impl<H: Handler> ErasedHandler for H {
    fn name(&self) -> &'static str {
        H::NAME
    }

    fn description(&self) -> &'static str {
        H::DESCRIPTION
    }

    fn request_schema(&self) -> Schema {
        schema_for!(H::Request)
    }

    fn response_schema(&self) -> Schema {
        schema_for!(H::Response)
    }

    fn call(&self, request: Value) -> Result<Value, InvokeError> {
        let request: H::Request = serde_path_to_error::deserialize(request)?;
        let response = self.invoke(request)?;
        serde_json::to_value(response).map_err(InvokeError::Encode)
    }
}
