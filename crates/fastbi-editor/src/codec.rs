//! YAML text form of configuration documents
//!
//! The editor buffer always holds text produced by [`serialize`] or typed by
//! the user. [`deserialize`] is its exact inverse for anything `serialize`
//! emitted, so `deserialize(serialize(m)) == m`.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::error;

use crate::error::ParseError;

/// Result of checking editor text without touching any state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// Whether the text parses into a configuration mapping
    pub valid: bool,
    /// Message for the host to display
    pub message: String,
}

impl ValidationOutcome {
    fn ok() -> Self {
        Self {
            valid: true,
            message: "YAML is valid".to_string(),
        }
    }

    fn invalid(err: &ParseError) -> Self {
        Self {
            valid: false,
            message: format!("Invalid YAML: {}", err),
        }
    }
}

/// Render a configuration mapping as editable YAML.
///
/// Falls back to indented JSON, which YAML parsers also accept, if the YAML
/// emitter fails. Never fails itself.
pub fn serialize(content: &Mapping) -> String {
    match serde_yaml::to_string(content) {
        Ok(text) => text,
        Err(yaml_err) => {
            error!("Error formatting YAML, falling back to JSON: {}", yaml_err);
            serde_json::to_string_pretty(content).unwrap_or_else(|json_err| {
                error!("Error formatting JSON fallback: {}", json_err);
                "{}".to_string()
            })
        }
    }
}

/// Parse editor text back into a configuration mapping.
///
/// Blank or comment-only text and an explicit `null` document are an empty
/// mapping. Any other non-mapping document is rejected. Merge keys
/// (`<<: *anchor`) are expanded, so the result never holds a `<<` entry.
pub fn deserialize(text: &str) -> Result<Mapping, ParseError> {
    if is_blank(text) {
        return Ok(Mapping::new());
    }

    let mut document = serde_yaml::from_str::<Value>(text)?;
    document.apply_merge()?;

    match document {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(ParseError::new(format!(
            "expected a mapping at the top level, found {}",
            describe(&other)
        ))),
    }
}

/// Check that `text` deserializes, reporting the parser message if not
pub fn validate(text: &str) -> ValidationOutcome {
    match deserialize(text) {
        Ok(_) => ValidationOutcome::ok(),
        Err(err) => ValidationOutcome::invalid(&err),
    }
}

fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
