use hs_core::ScriptError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> ScriptError {
    ScriptError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: ScriptError) -> i32 {
    tracing::debug!(code = %error.code, "command failed");
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> ScriptError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_json_invalid(error: serde_json::Error) -> ScriptError {
    map_error("CLI_JSON_INVALID", error)
}

pub(crate) fn map_cli_output(error: serde_json::Error) -> ScriptError {
    map_error("CLI_OUTPUT", error)
}
