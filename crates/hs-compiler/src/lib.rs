use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use hs_core::ScriptError;
use rhai::{Engine, AST};

/// Name of the per-call capability handle bound into every script scope.
pub const CONTEXT_HANDLE_NAME: &str = "context";

/// Shared entry template merged in front of every script body. The body
/// itself is the zero-argument entry block; the helper resolves context
/// variables through the call's handle, e.g. `context.var_or("hp", 0)`.
pub const ENTRY_PRELUDE: &str = r#"
fn var_or(name, fallback) {
    if this.has(name) { this.get(name) } else { fallback }
}
"#;

const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone)]
pub struct CompiledUnit {
    source: Arc<str>,
    ast: Option<AST>,
}

impl CompiledUnit {
    fn empty(source: &str) -> Self {
        Self {
            source: Arc::from(source),
            ast: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> Option<&AST> {
        self.ast.as_ref()
    }

    /// True when the source failed to compile and the unit runs as a no-op.
    pub fn is_empty(&self) -> bool {
        self.ast.is_none()
    }
}

pub fn try_compile(engine: &Engine, source: &str) -> Result<CompiledUnit, ScriptError> {
    let prelude = engine
        .compile(ENTRY_PRELUDE)
        .map_err(|error| ScriptError::compile(format!("Entry prelude failed: {}", error)))?;
    compile_with_prelude(engine, &prelude, source)
}

fn compile_with_prelude(
    engine: &Engine,
    prelude: &AST,
    source: &str,
) -> Result<CompiledUnit, ScriptError> {
    let body = engine
        .compile(source)
        .map_err(|error| ScriptError::compile(error.to_string()))?;
    Ok(CompiledUnit {
        source: Arc::from(source),
        ast: Some(prelude.merge(&body)),
    })
}

pub(crate) fn preview(source: &str) -> String {
    let flat = source.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut out = flat.chars().take(PREVIEW_CHARS).collect::<String>();
    out.push_str("...");
    out
}

/// Process-lifetime cache of compiled scripts keyed by exact source text.
#[derive(Default)]
pub struct ScriptCache {
    units: DashMap<String, Arc<CompiledUnit>>,
    prelude: OnceLock<AST>,
    compile_count: AtomicUsize,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&self, engine: &Engine, source: &str) -> Arc<CompiledUnit> {
        if let Some(unit) = self.units.get(source) {
            return Arc::clone(unit.value());
        }

        let entry = self
            .units
            .entry(source.to_string())
            .or_insert_with(|| Arc::new(self.compile(engine, source)));
        Arc::clone(entry.value())
    }

    pub fn compile_count(&self) -> usize {
        self.compile_count.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.units.contains_key(source)
    }

    pub fn clear(&self) {
        self.units.clear();
    }

    fn prelude(&self, engine: &Engine) -> &AST {
        self.prelude.get_or_init(|| {
            engine.compile(ENTRY_PRELUDE).unwrap_or_else(|error| {
                tracing::error!(%error, "entry prelude failed to compile");
                AST::empty()
            })
        })
    }

    fn compile(&self, engine: &Engine, source: &str) -> CompiledUnit {
        self.compile_count.fetch_add(1, Ordering::Relaxed);
        match compile_with_prelude(engine, self.prelude(engine), source) {
            Ok(unit) => {
                tracing::debug!(script = %preview(source), "compiled script");
                unit
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    script = %preview(source),
                    "script failed to compile; it will run as a no-op"
                );
                CompiledUnit::empty(source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sources_compile_once() {
        let engine = Engine::new();
        let cache = ScriptCache::new();

        let first = cache.get_or_compile(&engine, "let x = 1; x + 1");
        let second = cache.get_or_compile(&engine, "let x = 1; x + 1");

        assert_eq!(cache.compile_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!first.is_empty());
        assert_eq!(first.source(), "let x = 1; x + 1");
    }

    #[test]
    fn textually_distinct_sources_compile_separately() {
        let engine = Engine::new();
        let cache = ScriptCache::new();

        cache.get_or_compile(&engine, "1 + 1");
        cache.get_or_compile(&engine, "1+1");

        assert_eq!(cache.compile_count(), 2);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("1+1"));
    }

    #[test]
    fn compile_failure_is_cached_as_empty_unit() {
        let engine = Engine::new();
        let cache = ScriptCache::new();

        let unit = cache.get_or_compile(&engine, "this is not valid");
        assert!(unit.is_empty());
        assert!(unit.ast().is_none());

        cache.get_or_compile(&engine, "this is not valid");
        assert_eq!(cache.compile_count(), 1);
    }

    #[test]
    fn compiled_unit_carries_entry_prelude() {
        let engine = Engine::new();
        let unit = try_compile(&engine, "40 + 2").expect("compile should pass");
        let ast = unit.ast().expect("ast");
        assert!(ast.iter_functions().any(|function| function.name == "var_or"));
        let value = engine.eval_ast::<rhai::INT>(ast).expect("eval");
        assert_eq!(value, 42);
    }

    #[test]
    fn try_compile_reports_errors() {
        let engine = Engine::new();
        let error = try_compile(&engine, "let = ;").expect_err("should fail");
        assert!(error.is_compile_error());
    }

    #[test]
    fn concurrent_population_compiles_once() {
        let engine = Engine::new();
        let cache = ScriptCache::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..16 {
                        let unit = cache.get_or_compile(&engine, "let hp = 3; hp * 2");
                        assert!(!unit.is_empty());
                    }
                });
            }
        });

        assert_eq!(cache.compile_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_forces_recompile() {
        let engine = Engine::new();
        let cache = ScriptCache::new();
        cache.get_or_compile(&engine, "1");
        cache.clear();
        assert!(cache.is_empty());
        cache.get_or_compile(&engine, "1");
        assert_eq!(cache.compile_count(), 2);
    }

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("let a = 1;\n  a"), "let a = 1; a");
        let long = "x".repeat(100);
        assert!(preview(&long).ends_with("..."));
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS + 3);
    }
}
