//! Schema extraction.
//!
//! Turns a [`HandlerDeclaration`] into a [`FunctionDescription`]. Extraction
//! is a pure function of the declaration: it never runs handler code and two
//! extractions of the same declaration are identical.

use tracing::debug;

use super::declaration::{DeclaredField, HandlerDeclaration, TypeDeclaration};
use super::error::ExtractionError;
use super::types::{FieldSchema, FunctionDescription, ItemSchema, ObjectSchema, Primitive};

/// Description given to fields declared without one.
pub const PLACEHOLDER_DESCRIPTION: &str = "No description provided.";

/// Extraction policy.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Used when a handler has no description. `None` makes a missing
    /// description an error.
    pub description_fallback: Option<String>,
}

/// Extract the function description of one handler.
pub fn extract(
    declaration: &HandlerDeclaration,
    options: &ExtractOptions,
) -> Result<FunctionDescription, ExtractionError> {
    let handler = declaration.name.as_str();

    let description = declaration
        .description
        .as_deref()
        .and_then(normalize_doc)
        .or_else(|| options.description_fallback.as_deref().and_then(normalize_doc))
        .ok_or_else(|| ExtractionError::missing_description(handler))?;

    let parameters = extract_object(handler, &declaration.request)?;
    let returns = extract_object(handler, &declaration.response)?;

    debug!(
        handler,
        parameters = parameters.properties().len(),
        returns = returns.properties().len(),
        "Extracted function description"
    );

    Ok(FunctionDescription {
        name: declaration.name.clone(),
        description,
        parameters,
        returns,
    })
}

fn extract_object(
    handler: &str,
    declaration: &TypeDeclaration,
) -> Result<ObjectSchema, ExtractionError> {
    let fields = declaration
        .fields
        .iter()
        .map(|field| extract_field(handler, field))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ObjectSchema::new(fields))
}

fn extract_field(handler: &str, field: &DeclaredField) -> Result<FieldSchema, ExtractionError> {
    let (type_name, marked_optional) = strip_optional(&field.type_name);

    let primitive = resolve_primitive(type_name)
        .ok_or_else(|| ExtractionError::unsupported_type(handler, &field.name, &field.type_name))?;

    let items = match primitive {
        Primitive::Array => element_type(type_name)
            .and_then(resolve_primitive)
            .map(|primitive| ItemSchema { primitive }),
        _ => None,
    };

    let description = field
        .description
        .as_deref()
        .and_then(normalize_doc)
        .unwrap_or_else(|| PLACEHOLDER_DESCRIPTION.to_string());

    Ok(FieldSchema {
        name: field.name.clone(),
        primitive,
        description,
        items,
        required: !(field.optional || marked_optional),
    })
}

/// Strip an optional marker: `Option<T>`, `Optional[T]` or `T?`.
///
/// Returns the inner type name and whether a marker was present.
pub fn strip_optional(type_name: &str) -> (&str, bool) {
    let trimmed = type_name.trim();

    let inner = trimmed
        .strip_prefix("Option<")
        .and_then(|rest| rest.strip_suffix('>'))
        .or_else(|| {
            trimmed
                .strip_prefix("Optional[")
                .and_then(|rest| rest.strip_suffix(']'))
        })
        .or_else(|| trimmed.strip_suffix('?'));

    match inner {
        Some(inner) => (inner.trim(), true),
        None => (trimmed, false),
    }
}

/// Map a declared type name onto its primitive.
///
/// Generic and array forms resolve by their head: `Vec<T>`, `List[T]` and
/// `T[]` are arrays, `HashMap<K, V>` and `Dict[K, V]` are objects.
pub fn resolve_primitive(type_name: &str) -> Option<Primitive> {
    let type_name = type_name.trim();

    if let Some(inner) = type_name.strip_suffix("[]") {
        return (!inner.trim().is_empty()).then_some(Primitive::Array);
    }

    let (head, generic) = match type_name.find(['<', '[']) {
        Some(index) => (type_name[..index].trim(), true),
        None => (type_name, false),
    };

    let primitive = match head {
        "string" | "str" | "String" | "&str" => Primitive::String,
        "integer" | "int" | "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32"
        | "u64" | "usize" => Primitive::Integer,
        "number" | "float" | "double" | "f32" | "f64" => Primitive::Number,
        "boolean" | "bool" => Primitive::Boolean,
        "array" | "list" | "List" | "Vec" | "VecDeque" => Primitive::Array,
        "object" | "dict" | "Dict" | "map" | "Map" | "HashMap" | "BTreeMap" => Primitive::Object,
        _ => return None,
    };

    match (primitive, generic) {
        (Primitive::Array | Primitive::Object, _) | (_, false) => Some(primitive),
        _ => None,
    }
}

/// The element type named by an array declaration, if any.
fn element_type(type_name: &str) -> Option<&str> {
    let type_name = type_name.trim();

    if let Some(inner) = type_name.strip_suffix("[]") {
        return Some(inner.trim());
    }

    let open = type_name.find(['<', '['])?;
    let close = match type_name.as_bytes()[open] {
        b'<' => '>',
        _ => ']',
    };
    type_name[open + 1..]
        .strip_suffix(close)
        .map(str::trim)
        .filter(|inner| !inner.is_empty())
}

/// Collapse a doc string: trim each line, drop blank lines, join with spaces.
fn normalize_doc(text: &str) -> Option<String> {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (!joined.is_empty()).then_some(joined)
}
