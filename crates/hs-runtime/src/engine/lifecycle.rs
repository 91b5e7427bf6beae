pub struct ScriptRuntime {
    engine: Engine,
    cache: ScriptCache,
    registry: Arc<GlobalRegistry>,
    options: RuntimeOptions,
    seed: u32,
}

impl ScriptRuntime {
    pub fn new(options: RuntimeOptions) -> Result<Self, ScriptError> {
        if options.max_call_levels == 0 {
            return Err(ScriptError::new(
                "RUNTIME_OPTION_INVALID",
                "maxCallLevels must be greater than zero.",
            ));
        }
        Ok(Self::build(options))
    }

    fn build(options: RuntimeOptions) -> Self {
        let seed = options.random_seed.unwrap_or_else(clock_seed);
        let rng = Arc::new(ScriptRng::new(seed));
        let registry = Arc::new(GlobalRegistry::new());

        let mut engine = Engine::new();
        engine.set_max_operations(options.max_operations);
        engine.set_max_call_levels(options.max_call_levels);
        engine.on_print(|text| tracing::info!(target: "hostscript::script", "{}", text));
        engine.on_debug(|text, source, position| {
            tracing::debug!(
                target: "hostscript::script",
                source = source.unwrap_or_default(),
                %position,
                "{}",
                text
            )
        });
        register_object_type(&mut engine);
        register_context_type(&mut engine);
        register_path_functions(&mut engine);
        register_log_functions(&mut engine);
        register_random_functions(&mut engine, &rng);
        register_shortcut_resolver(&mut engine);

        tracing::debug!(
            seed,
            max_operations = options.max_operations,
            max_call_levels = options.max_call_levels,
            "script runtime ready"
        );

        Self {
            engine,
            cache: ScriptCache::new(),
            registry,
            options,
            seed,
        }
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    pub fn registry(&self) -> &GlobalRegistry {
        &self.registry
    }

    pub fn register_shortcut<F>(&self, name: &str, accessor: F) -> Result<(), ScriptError>
    where
        F: Fn() -> Option<HostValue> + Send + Sync + 'static,
    {
        self.registry.register(name, accessor)
    }
}

impl Default for ScriptRuntime {
    fn default() -> Self {
        Self::build(RuntimeOptions::default())
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() ^ elapsed.as_secs() as u32)
        .unwrap_or(1)
}

fn runtime_error(message: impl Into<String>) -> Box<EvalAltResult> {
    Box::new(EvalAltResult::ErrorRuntime(
        Dynamic::from(message.into()),
        Position::NONE,
    ))
}

fn register_object_type(engine: &mut Engine) {
    engine
        .register_type_with_name::<ObjectRef>("Object")
        .register_indexer_get(|object: &mut ObjectRef, member: ImmutableString| -> Dynamic {
            object
                .get(&member)
                .map(|value| host_to_dynamic(&value))
                .unwrap_or(Dynamic::UNIT)
        })
        .register_indexer_set(
            |object: &mut ObjectRef,
             member: ImmutableString,
             value: Dynamic|
             -> Result<(), Box<EvalAltResult>> {
                if object.set(&member, dynamic_to_host(value)) {
                    return Ok(());
                }
                Err(runtime_error(format!(
                    "cannot assign member \"{}\" on {}",
                    member, object
                )))
            },
        )
        .register_fn("to_string", |object: ObjectRef| object.to_string())
        .register_fn("type_name", |object: ObjectRef| object.type_name());
}

fn register_context_type(engine: &mut Engine) {
    engine
        .register_type_with_name::<ContextHandle>("Context")
        .register_indexer_get(|context: &mut ContextHandle, name: ImmutableString| -> Dynamic {
            context.get(&name).unwrap_or(Dynamic::UNIT)
        })
        .register_fn("get", |context: ContextHandle, name: ImmutableString| {
            context.get(&name).unwrap_or(Dynamic::UNIT)
        })
        .register_fn("has", |context: ContextHandle, name: ImmutableString| {
            context.has(&name)
        })
        .register_fn("names", |context: ContextHandle| -> Array {
            context.names().into_iter().map(Dynamic::from).collect()
        });
}

fn register_path_functions(engine: &mut Engine) {
    engine
        .register_fn("path_get", |root: Dynamic, path: ImmutableString| -> Dynamic {
            value_path::get(&dynamic_to_host(root), &path)
                .map(|value| host_to_dynamic(&value))
                .unwrap_or(Dynamic::UNIT)
        })
        .register_fn("path_exists", |root: Dynamic, path: ImmutableString| {
            value_path::exists(&dynamic_to_host(root), &path)
        })
        .register_fn(
            "path_set",
            |root: &mut Dynamic, path: ImmutableString, value: Dynamic| -> bool {
                let mut host = dynamic_to_host(root.clone());
                if !value_path::set(&mut host, &path, dynamic_to_host(value)) {
                    return false;
                }
                // Objects were written in place; plain containers need the
                // edited copy stored back into the variable.
                if !matches!(host, HostValue::Object(_)) {
                    *root = host_to_dynamic(&host);
                }
                true
            },
        );
}

fn register_log_functions(engine: &mut Engine) {
    engine
        .register_fn("log", |message: Dynamic| {
            tracing::info!(target: "hostscript::script", "{}", message)
        })
        .register_fn("warn", |message: Dynamic| {
            tracing::warn!(target: "hostscript::script", "{}", message)
        });
}

fn register_random_functions(engine: &mut Engine, rng: &Arc<ScriptRng>) {
    let int_rng = Arc::clone(rng);
    engine.register_fn(
        "rand_int",
        move |low: INT, high: INT| -> Result<INT, Box<EvalAltResult>> {
            if high < low {
                return Err(runtime_error(format!(
                    "rand_int({}, {}) expects low <= high.",
                    low, high
                )));
            }
            Ok(int_rng.int_inclusive(low, high))
        },
    );

    let float_rng = Arc::clone(rng);
    engine.register_fn("rand_float", move || -> FLOAT { float_rng.unit_float() });

    let chance_rng = Arc::clone(rng);
    engine.register_fn("chance", move |probability: FLOAT| -> bool {
        chance_rng.unit_float() < probability
    });

    let percent_rng = Arc::clone(rng);
    engine.register_fn("chance", move |percent: INT| -> bool {
        percent_rng.int_inclusive(1, 100) <= percent
    });
}

/// Resolves names that are not script locals against the active call:
/// `context` itself, then registered shortcuts. Inside script-defined
/// functions this is the only way either is visible.
#[allow(deprecated)]
fn register_shortcut_resolver(engine: &mut Engine) {
    engine.on_var(|name, index, context| {
        if index > 0 || context.scope().contains(name) {
            return Ok(None);
        }
        let Some(handle) = ActiveContext::current() else {
            return Ok(None);
        };
        if name == CONTEXT_HANDLE_NAME {
            return Ok(Some(Dynamic::from(handle)));
        }
        Ok(handle.shortcut(name))
    });
}
