#[cfg(test)]
mod tests {
    use super::*;
    use hs_core::{HostObject, MemberInfo, ValueKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Hero {
        health: i32,
        speed: f32,
        title: String,
        tags: BTreeMap<String, HostValue>,
    }

    impl HostObject for Hero {
        fn type_name(&self) -> &str {
            "Hero"
        }

        fn members(&self) -> Vec<MemberInfo> {
            vec![
                MemberInfo::property("Health", ValueKind::Int),
                MemberInfo::field("Speed", ValueKind::Float),
                MemberInfo::readonly_property("Title", ValueKind::String),
                MemberInfo::property("Tags", ValueKind::Map),
            ]
        }

        fn read(&self, member: &str) -> Option<HostValue> {
            Some(match member {
                "Health" => HostValue::Int(self.health),
                "Speed" => HostValue::Float(self.speed),
                "Title" => HostValue::String(self.title.clone()),
                "Tags" => HostValue::Map(self.tags.clone()),
                _ => return None,
            })
        }

        fn write(&mut self, member: &str, value: HostValue) -> bool {
            match (member, value) {
                ("Health", HostValue::Int(value)) => self.health = value,
                ("Speed", HostValue::Float(value)) => self.speed = value,
                ("Tags", HostValue::Map(value)) => self.tags = value,
                _ => return false,
            }
            true
        }
    }

    fn hero(health: i32) -> ObjectRef {
        ObjectRef::new(Hero {
            health,
            title: "Warden".to_string(),
            ..Hero::default()
        })
    }

    fn runtime() -> ScriptRuntime {
        ScriptRuntime::new(RuntimeOptions {
            random_seed: Some(1),
            ..RuntimeOptions::default()
        })
        .expect("runtime should build")
    }

    #[test]
    fn execute_returns_script_result() {
        let runtime = runtime();
        let context = ExecutionContext::new();
        assert_eq!(runtime.execute_as::<i32>("return 2 + 2;", &context), 4);
        assert_eq!(runtime.execute_as::<i32>("2 + 3", &context), 5);
        assert_eq!(
            runtime.execute_as::<String>("`hp: ${40 + 2}`", &context),
            "hp: 42"
        );
    }

    #[test]
    fn context_variables_are_visible_to_scripts() {
        let runtime = runtime();
        let context = ExecutionContext::new()
            .with("hp", 80)
            .with("name", "Ayla")
            .with("ratio", 0.5f32);
        assert_eq!(runtime.execute_as::<i32>("hp - 30", &context), 50);
        assert_eq!(
            runtime.execute_as::<String>("name + \"!\"", &context),
            "Ayla!"
        );
        assert_eq!(runtime.execute_as::<f32>("ratio * 2.0", &context), 1.0);
        assert!(runtime.execute_as::<bool>("context.has(\"hp\")", &context));
        assert_eq!(runtime.execute_as::<i32>("context[\"hp\"]", &context), 80);
    }

    #[test]
    fn compile_failure_yields_default_and_reports_error() {
        let runtime = runtime();
        let context = ExecutionContext::new();
        assert_eq!(runtime.execute_as::<i32>("this is not valid", &context), 0);
        assert!(runtime.execute("this is not valid", &context).is_unit());
        let error = runtime
            .try_execute("this is not valid", &context)
            .expect_err("compile error");
        assert!(error.is_compile_error());
        assert_eq!(runtime.cache().compile_count(), 1);
    }

    #[test]
    fn runtime_error_yields_default_and_reports_exec_error() {
        let runtime = runtime();
        let context = ExecutionContext::new();
        assert_eq!(runtime.execute_as::<i32>("throw \"boom\";", &context), 0);
        let error = runtime
            .try_execute("missing_function(1)", &context)
            .expect_err("exec error");
        assert_eq!(error.code, "EXEC_ERROR");
    }

    #[test]
    fn identical_scripts_compile_once() {
        let runtime = runtime();
        for hp in 0..5 {
            let context = ExecutionContext::new().with("hp", hp);
            assert_eq!(runtime.execute_as::<i32>("hp * 2", &context), hp * 2);
        }
        assert_eq!(runtime.cache().compile_count(), 1);
    }

    #[test]
    fn calls_do_not_leak_variables() {
        let runtime = runtime();
        let first = ExecutionContext::new().with("a", 1);
        let second = ExecutionContext::new().with("b", 2);
        assert!(runtime.execute_as::<bool>("is_def_var(\"a\")", &first));
        assert!(!runtime.execute_as::<bool>("is_def_var(\"a\")", &second));
        assert!(!runtime.execute_as::<bool>("context.has(\"a\")", &second));
        assert!(runtime.execute("let leak = 1;", &first).is_unit());
        assert!(!runtime.execute_as::<bool>("is_def_var(\"leak\")", &first));
    }

    #[test]
    fn concurrent_calls_keep_contexts_isolated() {
        let runtime = runtime();
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let runtime = &runtime;
                scope.spawn(move || {
                    for round in 0..20 {
                        let value = worker * 100 + round;
                        let context = ExecutionContext::new().with("n", value);
                        assert_eq!(runtime.execute_as::<i32>("n + 1", &context), value + 1);
                    }
                });
            }
        });
        assert_eq!(runtime.cache().compile_count(), 1);
    }

    #[test]
    fn path_set_from_script_updates_host_object() {
        let runtime = runtime();
        let target = hero(80);
        let context = ExecutionContext::new().with("target", target.clone());
        assert!(runtime.execute_as::<bool>("path_set(target, \"Health\", 50)", &context));
        assert_eq!(target.get("Health"), Some(HostValue::Int(50)));
        assert_eq!(
            runtime.execute_as::<i32>("path_get(target, \"Health\")", &context),
            50
        );
        assert!(!runtime.execute_as::<bool>("path_set(target, \"Title\", \"x\")", &context));
        assert!(!runtime.execute_as::<bool>("path_set(target, \"Health\", 1e10)", &context));
        assert!(!runtime.execute_as::<bool>("path_set(target, \"Health\", \"3e9\")", &context));
        assert_eq!(target.get("Health"), Some(HostValue::Int(50)));
        assert!(runtime.execute_as::<bool>("path_exists(target, \"Speed\")", &context));
        assert!(!runtime.execute_as::<bool>("path_exists(target, \"Mana\")", &context));
    }

    #[test]
    fn path_set_on_script_maps_writes_back() {
        let runtime = runtime();
        let context = ExecutionContext::new();
        let value = runtime.execute_as::<i32>(
            "let bag = #{ inner: #{ count: 1 } }; path_set(bag, \"inner.count\", 9); bag.inner.count",
            &context,
        );
        assert_eq!(value, 9);
    }

    #[test]
    fn object_indexer_reads_and_writes_members() {
        let runtime = runtime();
        let target = hero(10);
        let context = ExecutionContext::new().with("target", target.clone());
        assert_eq!(
            runtime.execute_as::<i32>("target[\"Health\"] += 5; target[\"health\"]", &context),
            15
        );
        assert_eq!(target.get("Health"), Some(HostValue::Int(15)));
        assert_eq!(
            runtime.execute_as::<String>("target.Title", &context),
            "Warden"
        );
        let error = runtime
            .try_execute("target[\"Title\"] = \"x\";", &context)
            .expect_err("read-only member");
        assert_eq!(error.code, "EXEC_ERROR");
        assert_eq!(runtime.execute_as::<String>("target.to_string()", &context), "<Hero>");
    }

    #[test]
    fn var_or_helper_falls_back_for_missing_variables() {
        let runtime = runtime();
        let context = ExecutionContext::new().with("hp", 3);
        assert_eq!(
            runtime.execute_as::<i32>("context.var_or(\"missing\", 7)", &context),
            7
        );
        assert_eq!(
            runtime.execute_as::<i32>("context.var_or(\"hp\", 7)", &context),
            3
        );
    }

    #[test]
    fn shortcuts_resolve_lazily_once_per_call() {
        let runtime = runtime();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let world = hero(99);
        let shared = world.clone();
        runtime
            .register_shortcut(crate::shortcuts::WORLD, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Some(HostValue::Object(shared.clone()))
            })
            .expect("register");

        let context = ExecutionContext::new();
        assert_eq!(runtime.execute_as::<i32>("1 + 1", &context), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(
            runtime.execute_as::<i32>(
                "path_get(world, \"Health\") + path_get(world, \"Health\")",
                &context
            ),
            198
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(runtime.execute_as::<i32>("let world = 5; world", &context), 5);
        assert_eq!(runtime.execute_as::<i32>("path_get(world, \"Health\")", &context), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shortcuts_and_context_are_visible_inside_script_functions() {
        let runtime = runtime();
        runtime
            .register_shortcut(crate::shortcuts::WORLD, || Some(HostValue::Int(7)))
            .expect("register");
        let context = ExecutionContext::new().with("hp", 3);

        assert_eq!(
            runtime.execute_as::<i32>("fn bonus() { world + 1 } bonus()", &context),
            8
        );
        assert_eq!(
            runtime.execute_as::<i32>(
                "fn hp_or(x) { context.var_or(\"hp\", x) } hp_or(1)",
                &context
            ),
            3
        );
        assert_eq!(
            runtime.execute_as::<i32>("fn pick(world) { world } pick(2)", &context),
            2
        );
        assert!(ActiveContext::current().is_none());
    }

    #[test]
    fn nested_executions_restore_the_outer_context() {
        let runtime = Arc::new(runtime());
        let inner = Arc::clone(&runtime);
        runtime
            .register_shortcut(crate::shortcuts::RESOURCES, move || {
                let nested = ExecutionContext::new().with("hp", 100);
                Some(HostValue::Int(inner.execute_as::<i32>("hp", &nested)))
            })
            .expect("register");

        let context = ExecutionContext::new().with("hp", 5);
        assert_eq!(
            runtime.execute_as::<i32>(
                "fn total() { resources + context.get(\"hp\") } total()",
                &context
            ),
            105
        );
        assert!(ActiveContext::current().is_none());
    }

    #[test]
    fn unregistered_shortcuts_are_undefined() {
        let runtime = runtime();
        let error = runtime
            .try_execute("library", &ExecutionContext::new())
            .expect_err("undefined variable");
        assert_eq!(error.code, "EXEC_ERROR");
    }

    #[test]
    fn reserved_and_invalid_bindings_are_skipped() {
        let runtime = runtime();
        runtime
            .register_shortcut(crate::shortcuts::CHARACTERS, || Some(HostValue::Int(4)))
            .expect("register");
        let context = ExecutionContext::new()
            .with("context", 1)
            .with("characters", 2)
            .with("bad name", 3)
            .with("ok", 5);
        assert_eq!(runtime.execute_as::<i32>("ok + characters", &context), 9);
        assert_eq!(
            runtime.check_binding("context").map_err(|error| error.code),
            Err("BIND_RESERVED_NAME".to_string())
        );
        assert_eq!(
            runtime.check_binding("let").map_err(|error| error.code),
            Err("BIND_RESERVED_NAME".to_string())
        );
        assert_eq!(
            runtime.check_binding("9lives").map_err(|error| error.code),
            Err("BIND_INVALID_NAME".to_string())
        );
        assert!(runtime.check_binding("hp").is_ok());
    }

    #[test]
    fn operation_limit_stops_runaway_scripts() {
        let runtime = ScriptRuntime::new(RuntimeOptions {
            max_operations: 1_000,
            ..RuntimeOptions::default()
        })
        .expect("runtime");
        let error = runtime
            .try_execute("loop { }", &ExecutionContext::new())
            .expect_err("runaway script");
        assert_eq!(error.code, "EXEC_ERROR");
        assert!(runtime.execute("loop { }", &ExecutionContext::new()).is_unit());
    }

    #[test]
    fn zero_call_levels_is_rejected() {
        let result = ScriptRuntime::new(RuntimeOptions {
            max_call_levels: 0,
            ..RuntimeOptions::default()
        });
        let error = result.err().expect("invalid options");
        assert_eq!(error.code, "RUNTIME_OPTION_INVALID");
    }

    #[test]
    fn seeded_random_helpers_are_deterministic() {
        let script = "[rand_int(1, 6), rand_int(1, 6), rand_int(1, 6), chance(50)]";
        let first = runtime().execute_host(script, &ExecutionContext::new());
        let second = runtime().execute_host(script, &ExecutionContext::new());
        assert_eq!(first, second);
        assert_eq!(runtime().seed(), 1);

        let runtime = runtime();
        let context = ExecutionContext::new();
        for _ in 0..50 {
            let value = runtime.execute_as::<i32>("rand_int(-2, 2)", &context);
            assert!((-2..=2).contains(&value));
            let value = runtime.execute_as::<f32>("rand_float()", &context);
            assert!((0.0..1.0).contains(&value));
        }
        assert!(!runtime.execute_as::<bool>("chance(0.0)", &context));
        assert!(runtime.execute_as::<bool>("chance(100)", &context));
        let error = runtime
            .try_execute("rand_int(3, 1)", &context)
            .expect_err("inverted range");
        assert_eq!(error.code, "EXEC_ERROR");
    }

    #[test]
    fn explore_includes_members_and_shortcuts() {
        let runtime = runtime();
        runtime
            .register_shortcut(crate::shortcuts::RESOURCES, || None)
            .expect("register");
        let target = hero(1);
        assert!(target.set(
            "Tags",
            HostValue::Map(BTreeMap::from([("elite".to_string(), HostValue::Bool(true))]))
        ));
        let paths = runtime.explore(&HostValue::Object(target));
        for expected in ["Health", "Speed", "Title", "Tags", "Tags[\"elite\"]", "resources"] {
            assert!(paths.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn host_side_path_helpers_delegate_to_resolver() {
        let runtime = runtime();
        let mut root = HostValue::Object(hero(80));
        assert!(runtime.path_set(&mut root, "Tags[\"k\"]", HostValue::Int(1)));
        assert_eq!(runtime.path_get(&root, "Tags.k"), Some(HostValue::Int(1)));
        assert!(runtime.path_exists(&root, "Health"));
        assert!(!runtime.path_set(&mut root, "Nope", HostValue::Int(1)));
    }
}
