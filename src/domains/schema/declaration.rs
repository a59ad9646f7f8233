//! Handler declarations - the raw input of extraction.
//!
//! A declaration is what a handler says about itself before normalization:
//! field names, declared type names, optionality and documentation. It comes
//! either from a manifest's `[request]`/`[response]` tables or from the JSON
//! schema `schemars` derives for a compiled handler's types.

use schemars::Schema;
use serde_json::Value;

use super::error::ExtractionError;
use crate::domains::handlers::ErasedHandler;

/// Field name used in errors about a type as a whole.
pub const ROOT_FIELD: &str = "<root>";

/// One field as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredField {
    pub name: String,
    /// Declared type name, possibly wrapped in an optional marker.
    pub type_name: String,
    /// Explicit optionality, in addition to any marker in `type_name`.
    pub optional: bool,
    pub description: Option<String>,
}

/// The declared fields of a request or response type, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub fields: Vec<DeclaredField>,
}

/// Everything extraction needs to know about one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDeclaration {
    pub name: String,
    pub description: Option<String>,
    pub request: TypeDeclaration,
    pub response: TypeDeclaration,
}

impl HandlerDeclaration {
    /// Declare a compiled handler under `name`.
    ///
    /// `description` overrides the handler's own documentation when present.
    pub fn from_plugin(
        name: impl Into<String>,
        description: Option<String>,
        plugin: &dyn ErasedHandler,
    ) -> Result<Self, ExtractionError> {
        let name = name.into();
        let request = TypeDeclaration::from_schema(&name, &plugin.request_schema())?;
        let response = TypeDeclaration::from_schema(&name, &plugin.response_schema())?;

        Ok(Self {
            description: description.or_else(|| Some(plugin.description().to_string())),
            name,
            request,
            response,
        })
    }
}

impl TypeDeclaration {
    /// Read the declared fields of an object schema produced by `schemars`.
    ///
    /// Fields missing from `required` are optional; the type name of each
    /// property is rendered in the same notation manifests use.
    pub fn from_schema(handler: &str, schema: &Schema) -> Result<Self, ExtractionError> {
        let value = schema.as_value();

        let root = type_name(value);
        if root != "object" {
            return Err(ExtractionError::unsupported_type(handler, ROOT_FIELD, root));
        }

        let required: Vec<&str> = value
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let fields = value
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| DeclaredField {
                        name: name.clone(),
                        type_name: type_name(property),
                        optional: !required.contains(&name.as_str()),
                        description: property
                            .get("description")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { fields })
    }
}

/// Render the type of a property schema in manifest notation.
///
/// Nullability is dropped (optionality is carried by `required`), `$ref`
/// targets are objects and arrays carry their element type as `T[]`.
/// Anything ambiguous renders to a name the lookup table rejects.
fn type_name(schema: &Value) -> String {
    if schema.get("$ref").is_some() {
        return "object".to_string();
    }

    match schema.get("type") {
        Some(Value::String(kind)) => with_items(kind, schema),
        Some(Value::Array(kinds)) => {
            let kinds: Vec<&str> = kinds
                .iter()
                .filter_map(Value::as_str)
                .filter(|kind| *kind != "null")
                .collect();
            match kinds.as_slice() {
                [kind] => with_items(kind, schema),
                _ => kinds.join("|"),
            }
        }
        _ => {
            let branches = schema
                .get("anyOf")
                .or_else(|| schema.get("oneOf"))
                .and_then(Value::as_array);

            match branches {
                Some(branches) => {
                    let names: Vec<String> = branches
                        .iter()
                        .filter(|branch| branch.get("type").and_then(Value::as_str) != Some("null"))
                        .map(type_name)
                        .collect();
                    match names.as_slice() {
                        [name] => name.clone(),
                        _ => names.join("|"),
                    }
                }
                None => "any".to_string(),
            }
        }
    }
}

fn with_items(kind: &str, schema: &Value) -> String {
    match (kind, schema.get("items")) {
        ("array", Some(items)) => format!("{}[]", type_name(items)),
        _ => kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::{JsonSchema, schema_for};
    use std::collections::HashMap;

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Inner {
        value: i32,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Sample {
        /// A name
        name: String,
        count: u32,
        ratio: Option<f64>,
        tags: Vec<String>,
        grid: Vec<Vec<f64>>,
        inner: Inner,
        maybe_inner: Option<Inner>,
        labels: HashMap<String, String>,
        flag: bool,
    }

    fn field<'a>(decl: &'a TypeDeclaration, name: &str) -> &'a DeclaredField {
        decl.fields.iter().find(|f| f.name == name).unwrap()
    }

    #[test]
    fn test_from_schema_reads_fields_in_order() {
        let decl = TypeDeclaration::from_schema("sample", &schema_for!(Sample)).unwrap();
        let names: Vec<_> = decl.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["name", "count", "ratio", "tags", "grid", "inner", "maybe_inner", "labels", "flag"]
        );
    }

    #[test]
    fn test_from_schema_types_and_optionality() {
        let decl = TypeDeclaration::from_schema("sample", &schema_for!(Sample)).unwrap();

        let name = field(&decl, "name");
        assert_eq!(name.type_name, "string");
        assert!(!name.optional);
        assert_eq!(name.description.as_deref(), Some("A name"));

        assert_eq!(field(&decl, "count").type_name, "integer");

        let ratio = field(&decl, "ratio");
        assert_eq!(ratio.type_name, "number");
        assert!(ratio.optional);

        assert_eq!(field(&decl, "tags").type_name, "string[]");
        assert_eq!(field(&decl, "grid").type_name, "number[][]");
        assert_eq!(field(&decl, "inner").type_name, "object");

        let maybe_inner = field(&decl, "maybe_inner");
        assert_eq!(maybe_inner.type_name, "object");
        assert!(maybe_inner.optional);

        assert_eq!(field(&decl, "labels").type_name, "object");
        assert_eq!(field(&decl, "flag").type_name, "boolean");
    }

    #[test]
    fn test_from_schema_rejects_non_object_root() {
        let err = TypeDeclaration::from_schema("list", &schema_for!(Vec<String>)).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::unsupported_type("list", ROOT_FIELD, "string[]")
        );
    }
}
