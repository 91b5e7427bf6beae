mod engine;
mod registry;

pub mod helpers {
    pub mod rhai_bridge;
    pub mod value_path;
}

pub use engine::{ContextHandle, ScriptRuntime};
pub use helpers::rhai_bridge::{dynamic_to_host, from_dynamic, host_to_dynamic, to_dynamic, FromDynamic};
pub use helpers::value_path as path;
pub use registry::{shortcuts, GlobalRegistry};
