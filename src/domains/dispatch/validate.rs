//! Payload decoding and validation against extracted schemas.
//!
//! The same `ObjectSchema` the catalog publishes is what requests are checked
//! against, so anything an agent builds from the catalog is accepted here.

use serde_json::{Map, Value};

use super::error::FieldIssue;
use crate::domains::schema::{ObjectSchema, ROOT_FIELD};

/// Decode a request body. An empty body is an empty object.
pub fn parse_body(body: &[u8]) -> Result<Value, Vec<FieldIssue>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body)
        .map_err(|e| vec![FieldIssue::new(ROOT_FIELD, format!("invalid JSON: {e}"))])
}

/// Check a value against an object schema, collecting every offending field.
///
/// Unknown fields are ignored. A `null` optional field counts as absent.
pub fn validate(schema: &ObjectSchema, value: &Value) -> Result<(), Vec<FieldIssue>> {
    let Some(object) = value.as_object() else {
        return Err(vec![FieldIssue::new(
            ROOT_FIELD,
            format!("expected object, got {}", kind_of(value)),
        )]);
    };

    let mut issues = Vec::new();

    for field in schema.properties() {
        let value = match object.get(&field.name) {
            None | Some(Value::Null) if field.required => {
                issues.push(FieldIssue::new(&field.name, "missing required field"));
                continue;
            }
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };

        if !field.primitive.matches(value) {
            issues.push(FieldIssue::new(
                &field.name,
                format!("expected {}, got {}", field.primitive, kind_of(value)),
            ));
            continue;
        }

        if let (Some(items), Some(elements)) = (&field.items, value.as_array()) {
            for (index, element) in elements.iter().enumerate() {
                if !items.primitive.matches(element) {
                    issues.push(FieldIssue::new(
                        format!("{}[{}]", field.name, index),
                        format!("expected {}, got {}", items.primitive, kind_of(element)),
                    ));
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
