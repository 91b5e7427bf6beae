use std::fs;
use std::path::Path;

use hs_core::{ExecutionContext, HostValue, RuntimeOptions, ScriptError};
use serde_json::Value as JsonValue;

use crate::{map_cli_json_invalid, map_cli_source_read};

pub(crate) fn read_source(path: &str) -> Result<String, ScriptError> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err(ScriptError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("File does not exist: {}", path.display()),
        ));
    }
    fs::read_to_string(path).map_err(map_cli_source_read)
}

pub(crate) fn read_json(path: &str) -> Result<JsonValue, ScriptError> {
    let raw = read_source(path)?;
    serde_json::from_str(&raw).map_err(map_cli_json_invalid)
}

pub(crate) fn load_data(path: &str) -> Result<HostValue, ScriptError> {
    Ok(HostValue::from_json(read_json(path)?))
}

/// Reads a context fixture: a JSON object mapping variable names to values.
pub(crate) fn load_context(path: Option<&str>) -> Result<ExecutionContext, ScriptError> {
    let Some(path) = path else {
        return Ok(ExecutionContext::new());
    };
    match read_json(path)? {
        JsonValue::Object(entries) => Ok(entries
            .into_iter()
            .map(|(name, value)| (name, HostValue::from_json(value)))
            .collect()),
        other => Err(ScriptError::new(
            "CLI_CONTEXT_INVALID",
            format!("Context fixture must be a JSON object, found {}.", json_kind(&other)),
        )),
    }
}

pub(crate) fn load_options(path: Option<&str>) -> Result<RuntimeOptions, ScriptError> {
    match path {
        Some(path) => RuntimeOptions::from_json_str(&read_source(path)?),
        None => Ok(RuntimeOptions::default()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
