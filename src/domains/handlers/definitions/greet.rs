//! Greet handler definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::handlers::{Handler, HandlerError};

/// Request for the greet handler.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GreetRequest {
    /// Name of person
    pub name: String,
}

/// Response of the greet handler.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GreetResponse {
    /// Greeting with name of person
    pub greeting: String,
}

/// Greets a person by name.
pub struct GreetHandler;

impl Handler for GreetHandler {
    const NAME: &'static str = "greet";
    const DESCRIPTION: &'static str = "Greet person by name";

    type Request = GreetRequest;
    type Response = GreetResponse;

    fn invoke(&self, request: GreetRequest) -> Result<GreetResponse, HandlerError> {
        debug!("Greeting {}", request.name);
        Ok(GreetResponse {
            greeting: format!("Hello {}", request.name),
        })
    }
}
