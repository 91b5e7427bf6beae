const RESERVED_WORDS: &[&str] = &[
    "true", "false", "let", "const", "if", "else", "switch", "do", "while", "until", "loop",
    "for", "in", "continue", "break", "return", "throw", "try", "catch", "fn", "private",
    "import", "export", "as", "this", "global", "is_def_var", "is_def_fn", "is_shared", "Fn",
    "call", "curry", "eval", "type_of", "print", "debug",
];

pub(crate) fn is_identifier(name: &str) -> bool {
    static IDENTIFIER: OnceLock<Option<Regex>> = OnceLock::new();
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name))
}

impl ScriptRuntime {
    /// Runs `source` against `context` and returns the script's result.
    /// Failures are logged and yield `()`.
    pub fn execute(&self, source: &str, context: &ExecutionContext) -> Dynamic {
        match self.try_execute(source, context) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(code = %error.code, "{}", error.message);
                Dynamic::UNIT
            }
        }
    }

    /// Like `execute`, converting the result to `T`; failures and
    /// unconvertible results yield `T::default()`.
    pub fn execute_as<T: FromDynamic>(&self, source: &str, context: &ExecutionContext) -> T {
        from_dynamic(&self.execute(source, context))
    }

    pub fn execute_host(&self, source: &str, context: &ExecutionContext) -> HostValue {
        dynamic_to_host(self.execute(source, context))
    }

    pub fn try_execute(
        &self,
        source: &str,
        context: &ExecutionContext,
    ) -> Result<Dynamic, ScriptError> {
        let unit = self.cache.get_or_compile(&self.engine, source);
        let Some(ast) = unit.ast() else {
            return Err(ScriptError::compile(format!(
                "Script failed to compile: {}",
                source.trim()
            )));
        };

        let (mut scope, handle) = self.bind_scope(context);
        let _active = ActiveContext::enter(handle);
        self.engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, ast)
            .map_err(|error| ScriptError::exec(error.to_string()))
    }

    /// Rejects names that cannot be bound as script variables.
    pub fn check_binding(&self, name: &str) -> Result<(), ScriptError> {
        if !is_identifier(name) {
            return Err(ScriptError::new(
                "BIND_INVALID_NAME",
                format!("Context variable \"{}\" is not a valid identifier.", name),
            ));
        }
        if name == CONTEXT_HANDLE_NAME
            || RESERVED_WORDS.contains(&name)
            || self.registry.contains(name)
        {
            return Err(ScriptError::new(
                "BIND_RESERVED_NAME",
                format!("Context variable \"{}\" uses a reserved name.", name),
            ));
        }
        Ok(())
    }

    fn bind_scope(&self, context: &ExecutionContext) -> (Scope<'static>, ContextHandle) {
        let mut scope = Scope::new();
        let mut vars = BTreeMap::new();
        for (name, value) in context.iter() {
            if let Err(error) = self.check_binding(name) {
                tracing::warn!(code = %error.code, "{}; binding skipped", error.message);
                continue;
            }
            let value = host_to_dynamic(value);
            scope.push_dynamic(name.clone(), value.clone());
            vars.insert(name.clone(), value);
        }
        let handle = ContextHandle::new(vars, Arc::clone(&self.registry));
        scope.push(CONTEXT_HANDLE_NAME, handle.clone());
        (scope, handle)
    }

    pub fn path_get(&self, root: &HostValue, path: &str) -> Option<HostValue> {
        value_path::get(root, path)
    }

    pub fn path_set(&self, root: &mut HostValue, path: &str, value: HostValue) -> bool {
        let written = value_path::set(root, path, value);
        if !written {
            tracing::debug!(path, "path write rejected");
        }
        written
    }

    pub fn path_exists(&self, root: &HostValue, path: &str) -> bool {
        value_path::exists(root, path)
    }

    /// Lists addressable paths under `root` plus every registered shortcut,
    /// logging each one.
    pub fn explore(&self, root: &HostValue) -> Vec<String> {
        let paths = value_path::explore(root, &self.registry.names());
        for path in &paths {
            tracing::info!(target: "hostscript::explore", "{}", path);
        }
        paths
    }
}
