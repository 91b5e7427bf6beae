use std::sync::OnceLock;

use hs_core::{ExecutionContext, HostValue, ObjectRef, RuntimeOptions, ScriptError};
use hs_runtime::{FromDynamic, ScriptRuntime};
use rhai::Dynamic;

static RUNTIME: OnceLock<ScriptRuntime> = OnceLock::new();

/// Configures the process-wide runtime. Must run before the first script
/// executes; afterwards the runtime is fixed.
pub fn install_runtime(options: RuntimeOptions) -> Result<&'static ScriptRuntime, ScriptError> {
    let runtime = ScriptRuntime::new(options)?;
    let mut installed = false;
    let current = RUNTIME.get_or_init(|| {
        installed = true;
        runtime
    });
    if !installed {
        return Err(ScriptError::new(
            "API_RUNTIME_ALREADY_INSTALLED",
            "The global script runtime is already initialized.",
        ));
    }
    Ok(current)
}

pub fn runtime() -> &'static ScriptRuntime {
    RUNTIME.get_or_init(ScriptRuntime::default)
}

pub fn execute(source: &str, context: &ExecutionContext) -> Dynamic {
    runtime().execute(source, context)
}

pub fn execute_as<T: FromDynamic>(source: &str, context: &ExecutionContext) -> T {
    runtime().execute_as(source, context)
}

pub fn execute_host(source: &str, context: &ExecutionContext) -> HostValue {
    runtime().execute_host(source, context)
}

pub fn path_get(root: &HostValue, path: &str) -> Option<HostValue> {
    runtime().path_get(root, path)
}

pub fn path_set(root: &mut HostValue, path: &str, value: impl Into<HostValue>) -> bool {
    runtime().path_set(root, path, value.into())
}

pub fn path_exists(root: &HostValue, path: &str) -> bool {
    runtime().path_exists(root, path)
}

pub fn path_explore(root: &HostValue) -> Vec<String> {
    runtime().explore(root)
}

pub fn register_shortcut<F>(name: &str, accessor: F) -> Result<(), ScriptError>
where
    F: Fn() -> Option<HostValue> + Send + Sync + 'static,
{
    runtime().register_shortcut(name, accessor)
}

pub fn register_shortcut_object(name: &str, object: &ObjectRef) -> Result<(), ScriptError> {
    runtime().registry().register_object(name, object)
}
