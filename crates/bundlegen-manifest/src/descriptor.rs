//! Parsing of descriptor streams written by the extraction process
//!
//! Output that is not JSON at all is fatal. JSON values with the wrong shape
//! are returned as [`RejectedDescriptor`]s so one misbehaving plugin only
//! loses its own bundles.

use crate::errors::ManifestError;
use crate::types::{BundleDescriptor, RejectedDescriptor};
use serde_json::{Map, Value};

/// One parsed record: a descriptor, or the reason it was rejected
pub type DescriptorRecord = Result<BundleDescriptor, RejectedDescriptor>;

/// Parse newline-delimited descriptors. Blank lines are skipped; a line that
/// is not valid JSON is an error.
pub fn parse_descriptor_lines(output: &str) -> Result<Vec<DescriptorRecord>, ManifestError> {
    output
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<Value>(line.trim())
                .map(descriptor_from_value)
                .map_err(|source| ManifestError::MalformedLine {
                    line: idx + 1,
                    source,
                })
        })
        .collect()
}

/// Parse a single JSON array of descriptors
pub fn parse_descriptor_array(output: &str) -> Result<Vec<DescriptorRecord>, ManifestError> {
    let values: Vec<Value> =
        serde_json::from_str(output.trim()).map_err(ManifestError::MalformedArray)?;
    Ok(values.into_iter().map(descriptor_from_value).collect())
}

/// Check the field types of one JSON value and build the descriptor.
/// Unknown fields are ignored; `null` counts as absent.
pub fn descriptor_from_value(value: Value) -> DescriptorRecord {
    let Value::Object(map) = value else {
        return Err(RejectedDescriptor {
            name: None,
            field: None,
            reason: format!("expected a JSON object, found {}", kind(&value)),
        });
    };
    let name = map.get("name").and_then(Value::as_str).map(String::from);

    Ok(BundleDescriptor {
        name: string_field(&map, "name", name.as_deref())?,
        entry_file: string_field(&map, "entry_file", name.as_deref())?,
        module_path: string_field(&map, "module_path", name.as_deref())?,
        stats_file: string_field(&map, "stats_file", name.as_deref())?,
        async_file: string_field(&map, "async_file", name.as_deref())?,
        external: bool_field(&map, "external", name.as_deref())?,
        core: bool_field(&map, "core", name.as_deref())?,
    })
}

fn string_field(
    map: &Map<String, Value>,
    field: &str,
    name: Option<&str>,
) -> Result<Option<String>, RejectedDescriptor> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(wrong_type(field, "a string", other, name)),
    }
}

fn bool_field(
    map: &Map<String, Value>,
    field: &str,
    name: Option<&str>,
) -> Result<Option<bool>, RejectedDescriptor> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(other) => Err(wrong_type(field, "a boolean", other, name)),
    }
}

fn wrong_type(
    field: &str,
    expected: &str,
    found: &Value,
    name: Option<&str>,
) -> RejectedDescriptor {
    RejectedDescriptor {
        name: name.map(String::from),
        field: Some(field.to_string()),
        reason: format!("expected {}, found {}", expected, kind(found)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
