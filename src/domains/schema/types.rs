//! Normalized schema types exported to tool-calling agents.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// The closed set of primitive types a field may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl Primitive {
    /// The JSON schema name of this primitive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether a JSON value is an instance of this primitive.
    ///
    /// Integers are numbers, but not the other way around.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element type of an array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemSchema {
    #[serde(rename = "type")]
    pub primitive: Primitive,
}

/// One declared field of a request or response type.
///
/// Serialized as the JSON schema of the property; the name is the key in the
/// enclosing `properties` map and `required` lives in the enclosing list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    #[serde(skip)]
    pub name: String,

    #[serde(rename = "type")]
    pub primitive: Primitive,

    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemSchema>,

    #[serde(skip)]
    pub required: bool,
}

/// Schema of a request or response object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSchema {
    #[serde(rename = "type")]
    kind: &'static str,

    #[serde(serialize_with = "serialize_properties")]
    properties: Vec<FieldSchema>,

    required: Vec<String>,
}

impl ObjectSchema {
    /// Build an object schema; `required` follows the field order.
    pub fn new(properties: Vec<FieldSchema>) -> Self {
        let required = properties
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.clone())
            .collect();

        Self {
            kind: "object",
            properties,
            required,
        }
    }

    /// Fields in declaration order.
    pub fn properties(&self) -> &[FieldSchema] {
        &self.properties
    }

    /// Names of the required fields, in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Look up a field by name.
    pub fn property(&self, name: &str) -> Option<&FieldSchema> {
        self.properties.iter().find(|field| field.name == name)
    }
}

fn serialize_properties<S: Serializer>(
    properties: &[FieldSchema],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(properties.len()))?;
    for field in properties {
        map.serialize_entry(&field.name, field)?;
    }
    map.end()
}

/// Agent-consumable description of one handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDescription {
    pub name: String,
    pub description: String,
    pub parameters: ObjectSchema,
    pub returns: ObjectSchema,
}
