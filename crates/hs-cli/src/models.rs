use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CommandOutcome {
    Value(JsonValue),
    Checked(CheckReport),
    Paths(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckReport {
    pub(crate) source_chars: usize,
    pub(crate) functions: Vec<String>,
}
