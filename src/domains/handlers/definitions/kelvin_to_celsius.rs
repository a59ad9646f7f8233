//! Kelvin to Celsius conversion handler.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domains::handlers::{Handler, HandlerError};

const ABSOLUTE_ZERO_CELSIUS: f64 = -273.15;

/// Request for the conversion handler.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct KelvinToCelsiusRequest {
    /// Temperature in Kelvin.
    pub kelvin: f64,
}

/// Response of the conversion handler.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct KelvinToCelsiusResponse {
    /// Temperature in Celsius, rounded to the nearest degree.
    pub celsius: i64,
}

/// Converts Kelvin to Celsius.
pub struct KelvinToCelsiusHandler;

impl Handler for KelvinToCelsiusHandler {
    const NAME: &'static str = "kelvin_to_celsius";
    const DESCRIPTION: &'static str = "Converts Kelvin to Celsius.";

    type Request = KelvinToCelsiusRequest;
    type Response = KelvinToCelsiusResponse;

    fn invoke(
        &self,
        request: KelvinToCelsiusRequest,
    ) -> Result<KelvinToCelsiusResponse, HandlerError> {
        if !request.kelvin.is_finite() || request.kelvin < 0.0 {
            return Err(HandlerError::invalid_input(format!(
                "{} K is below absolute zero",
                request.kelvin
            )));
        }

        Ok(KelvinToCelsiusResponse {
            celsius: (request.kelvin + ABSOLUTE_ZERO_CELSIUS).round() as i64,
        })
    }
}
