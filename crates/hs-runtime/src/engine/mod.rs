mod rng;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use hs_compiler::{ScriptCache, CONTEXT_HANDLE_NAME};
use hs_core::{ExecutionContext, HostValue, ObjectRef, RuntimeOptions, ScriptError};
use regex::Regex;
use rhai::{Array, Dynamic, Engine, EvalAltResult, ImmutableString, Position, Scope, FLOAT, INT};

use crate::helpers::rhai_bridge::{dynamic_to_host, from_dynamic, host_to_dynamic, FromDynamic};
use crate::helpers::value_path;
use crate::registry::GlobalRegistry;
use rng::ScriptRng;

include!("context.rs");
include!("lifecycle.rs");
include!("eval.rs");
include!("tests.rs");
