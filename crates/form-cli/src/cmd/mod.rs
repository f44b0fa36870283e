pub mod check;
pub mod lookup;
pub mod resolve;
pub mod schema;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use form_spec::{DataModel, FormSchema};
use serde_json::Value;

/// Loads a form document, TOML when the extension says so, JSON otherwise.
pub fn load_document(path: &Path) -> Result<FormSchema> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let document = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => FormSchema::from_toml_str(&raw),
        _ => FormSchema::from_json_str(&raw),
    };
    document.with_context(|| format!("failed to parse schema {}", path.display()))
}

/// Loads a JSON object used as the initial data model.
pub fn load_model(path: Option<&Path>) -> Result<DataModel> {
    let Some(path) = path else {
        return Ok(DataModel::new());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read model {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse model {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "model {} must be a JSON object, found {}",
            path.display(),
            kind_of(&other)
        ),
    }
}

/// Parses `name=value`; the value is JSON, falling back to a plain string.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("missing field name in '{raw}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
