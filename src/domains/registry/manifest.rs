//! Handler manifests.
//!
//! A manifest is the on-disk source unit of a handler: its documentation,
//! its invocation binding and, for command handlers, its declared request
//! and response fields. Manifests are plain data; reading one never runs
//! anything.

use serde::Deserialize;
use toml::{Table, Value};

use crate::domains::schema::{DeclaredField, TypeDeclaration};

/// Template written into empty manifests before they are loaded.
pub const SCAFFOLD_TEMPLATE: &str = r#"# Scaffolded handler. Replace the description and the binding.
#
# Bind a compiled handler:
#   [invoke]
#   builtin = "greet"
#
# Or run a command that reads the request JSON on stdin and prints the
# response JSON on stdout, declaring both shapes:
#   [invoke]
#   command = ["python3", "handler.py"]
#
#   [request]
#   name = { type = "string", description = "Name of person" }
#
#   [response]
#   greeting = { type = "string", description = "Greeting with name of person" }

description = "Greet person by name"

[invoke]
builtin = "greet"
"#;

/// Parsed manifest file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Handler documentation.
    pub description: Option<String>,

    /// How the handler is invoked.
    pub invoke: Option<InvokeSection>,

    /// Declared request fields (command handlers only).
    pub request: Option<Table>,

    /// Declared response fields (command handlers only).
    pub response: Option<Table>,
}

/// The `[invoke]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvokeSection {
    /// Key of a compiled handler in the plugin table.
    pub builtin: Option<String>,

    /// Program and arguments of an external handler process.
    pub command: Option<Vec<String>>,

    /// Per-handler invocation timeout, overriding the global one.
    pub timeout_secs: Option<u64>,
}

/// A field entry: either a bare type name or a full table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldSpec {
    Short(String),
    Full {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        optional: bool,
    },
}

impl Manifest {
    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.message().to_string())
    }
}

/// Whether a source unit has no content worth parsing.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Read a `[request]` or `[response]` table into a declaration, keeping the
/// order fields are written in.
pub fn declared_fields(table: &Table) -> Result<TypeDeclaration, String> {
    let fields = table
        .iter()
        .map(|(name, value)| declared_field(name, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TypeDeclaration { fields })
}

fn declared_field(name: &str, value: &Value) -> Result<DeclaredField, String> {
    let spec: FieldSpec = value
        .clone()
        .try_into()
        .map_err(|_| format!("field '{name}' must be a type name or a table with a 'type' key"))?;

    Ok(match spec {
        FieldSpec::Short(type_name) => DeclaredField {
            name: name.to_string(),
            type_name,
            optional: false,
            description: None,
        },
        FieldSpec::Full {
            type_name,
            description,
            optional,
        } => DeclaredField {
            name: name.to_string(),
            type_name,
            optional,
            description,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_manifest() {
        let manifest = Manifest::parse(
            r#"
            description = "Gets temperature of a city."

            [invoke]
            command = ["python3", "weather.py"]
            timeout_secs = 5

            [request]
            lon = { type = "number", description = "Longitude of the city." }
            lat = { type = "number", description = "Latitude of the city." }
            units = "Option<string>"

            [response]
            temperature = "number"
            "#,
        )
        .unwrap();

        let invoke = manifest.invoke.unwrap();
        assert_eq!(invoke.command.unwrap(), vec!["python3", "weather.py"]);
        assert_eq!(invoke.timeout_secs, Some(5));

        let request = declared_fields(manifest.request.as_ref().unwrap()).unwrap();
        let names: Vec<_> = request.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["lon", "lat", "units"]);
        assert_eq!(request.fields[0].description.as_deref(), Some("Longitude of the city."));
        assert_eq!(request.fields[2].type_name, "Option<string>");
        assert!(request.fields[2].description.is_none());
    }

    #[test]
    fn test_scaffold_template_parses() {
        let manifest = Manifest::parse(SCAFFOLD_TEMPLATE).unwrap();
        assert_eq!(manifest.invoke.unwrap().builtin.as_deref(), Some("greet"));
        assert!(manifest.description.is_some());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Manifest::parse("handler = \"x\"").is_err());
        assert!(Manifest::parse("[invoke]\nscript = \"x.py\"").is_err());
    }

    #[test]
    fn test_bad_field_entry() {
        let manifest = Manifest::parse("[request]\nname = 3").unwrap();
        let err = declared_fields(manifest.request.as_ref().unwrap()).unwrap_err();
        assert!(err.contains("'name'"));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \n\t"));
        assert!(!is_blank("description = \"x\""));
    }
}
