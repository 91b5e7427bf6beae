/// Per-call capability handle bound into the script scope as `context`.
///
/// Holds the call's variables and a memo of shortcut values resolved during
/// the call. Every execution builds its own handle, so concurrent calls never
/// observe each other's variables.
#[derive(Clone)]
pub struct ContextHandle {
    inner: Arc<ContextState>,
}

struct ContextState {
    vars: BTreeMap<String, Dynamic>,
    shortcuts: Mutex<BTreeMap<String, Dynamic>>,
    registry: Arc<GlobalRegistry>,
}

impl ContextHandle {
    pub(crate) fn new(vars: BTreeMap<String, Dynamic>, registry: Arc<GlobalRegistry>) -> Self {
        Self {
            inner: Arc::new(ContextState {
                vars,
                shortcuts: Mutex::new(BTreeMap::new()),
                registry,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<Dynamic> {
        match self.inner.vars.get(name) {
            Some(value) => Some(value.clone()),
            None => self.shortcut(name),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.vars.contains_key(name) || self.shortcut(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.vars.keys().cloned().collect()
    }

    /// Resolves a registered shortcut, at most once per handle.
    pub fn shortcut(&self, name: &str) -> Option<Dynamic> {
        if let Some(value) = self.memo().get(name) {
            return Some(value.clone());
        }
        if !self.inner.registry.contains(name) {
            return None;
        }

        let value = host_to_dynamic(&self.inner.registry.resolve(name)?);
        tracing::trace!(name, "resolved shortcut");
        Some(
            self.memo()
                .entry(name.to_string())
                .or_insert(value)
                .clone(),
        )
    }

    fn memo(&self) -> MutexGuard<'_, BTreeMap<String, Dynamic>> {
        self.inner
            .shortcuts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

thread_local! {
    static ACTIVE_CONTEXTS: RefCell<Vec<ContextHandle>> = const { RefCell::new(Vec::new()) };
}

/// Marks a handle as the innermost call running on this thread until dropped.
///
/// Script-defined functions get a fresh scope, so the resolver finds the
/// call's handle here rather than through the `context` scope variable.
/// Nested executions push and pop in order.
struct ActiveContext;

impl ActiveContext {
    fn enter(handle: ContextHandle) -> Self {
        ACTIVE_CONTEXTS.with(|stack| stack.borrow_mut().push(handle));
        Self
    }

    fn current() -> Option<ContextHandle> {
        ACTIVE_CONTEXTS.with(|stack| stack.borrow().last().cloned())
    }
}

impl Drop for ActiveContext {
    fn drop(&mut self) {
        ACTIVE_CONTEXTS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
