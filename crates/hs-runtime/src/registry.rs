use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use hs_compiler::CONTEXT_HANDLE_NAME;
use hs_core::{HostValue, ObjectRef, ScriptError};

use crate::engine::is_identifier;

/// Well-known global names scripts can use without them being passed in.
pub mod shortcuts {
    pub const CHARACTERS: &str = "characters";
    pub const WORLD: &str = "world";
    pub const RESOURCES: &str = "resources";
    pub const PERSISTENCE: &str = "persistence";
    pub const LIBRARY: &str = "library";
    pub const COMMITTEE: &str = "committee";

    pub const ALL: [&str; 6] = [CHARACTERS, WORLD, RESOURCES, PERSISTENCE, LIBRARY, COMMITTEE];
}

type Accessor = Arc<dyn Fn() -> Option<HostValue> + Send + Sync>;

/// Name-to-accessor table for host singletons. Accessors run at most once per
/// execution call, and only when a script names the shortcut.
#[derive(Default)]
pub struct GlobalRegistry {
    entries: RwLock<BTreeMap<String, Accessor>>,
}

impl GlobalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, name: &str, accessor: F) -> Result<(), ScriptError>
    where
        F: Fn() -> Option<HostValue> + Send + Sync + 'static,
    {
        if name == CONTEXT_HANDLE_NAME {
            return Err(ScriptError::new(
                "BIND_RESERVED_NAME",
                format!("Shortcut name \"{}\" is reserved.", name),
            ));
        }
        if !is_identifier(name) {
            return Err(ScriptError::new(
                "BIND_INVALID_NAME",
                format!("Shortcut name \"{}\" is not a valid identifier.", name),
            ));
        }
        let replaced = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::new(accessor))
            .is_some();
        tracing::debug!(name, replaced, "registered shortcut");
        Ok(())
    }

    /// Registers a host object without taking ownership; the shortcut
    /// resolves to nothing once the host drops it.
    pub fn register_object(&self, name: &str, object: &ObjectRef) -> Result<(), ScriptError> {
        let weak = object.downgrade();
        self.register(name, move || weak.upgrade().map(HostValue::Object))
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn resolve(&self, name: &str) -> Option<HostValue> {
        let accessor = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()?;
        // The table lock is released before host code runs.
        accessor().filter(|value| !value.is_null())
    }
}
