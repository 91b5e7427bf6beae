use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ScriptError {
    pub code: String,
    pub message: String,
}

impl ScriptError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn compile(message: impl Into<String>) -> Self {
        Self::new("COMPILE_ERROR", message)
    }

    pub fn exec(message: impl Into<String>) -> Self {
        Self::new("EXEC_ERROR", message)
    }

    pub fn is_compile_error(&self) -> bool {
        self.code == "COMPILE_ERROR"
    }
}
