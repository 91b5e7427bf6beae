use hs_core::{HostValue, ObjectRef, ValueKind};
use rhai::{Array, Dynamic, ImmutableString, Map, FLOAT, INT};

pub fn to_dynamic(value: impl Into<HostValue>) -> Dynamic {
    host_to_dynamic(&value.into())
}

pub fn host_to_dynamic(value: &HostValue) -> Dynamic {
    match value {
        HostValue::Null => Dynamic::UNIT,
        HostValue::Bool(value) => Dynamic::from_bool(*value),
        HostValue::Int(value) => Dynamic::from_int(*value),
        HostValue::Float(value) => Dynamic::from_float(*value),
        HostValue::String(value) => Dynamic::from(value.clone()),
        HostValue::List(values) => {
            Dynamic::from_array(values.iter().map(host_to_dynamic).collect::<Array>())
        }
        HostValue::Map(values) => {
            let mut map = Map::new();
            for (key, value) in values {
                map.insert(key.as_str().into(), host_to_dynamic(value));
            }
            Dynamic::from_map(map)
        }
        HostValue::Object(object) => Dynamic::from(object.clone()),
    }
}

/// Never fails: engine values without a host counterpart are carried over
/// as their string representation.
pub fn dynamic_to_host(value: Dynamic) -> HostValue {
    let value = value.flatten();
    if value.is_unit() {
        return HostValue::Null;
    }
    if value.is::<bool>() {
        return HostValue::Bool(value.cast::<bool>());
    }
    if value.is::<INT>() {
        return HostValue::Int(value.cast::<INT>());
    }
    if value.is::<FLOAT>() {
        return HostValue::Float(value.cast::<FLOAT>());
    }
    if value.is::<ImmutableString>() {
        return HostValue::String(value.cast::<ImmutableString>().to_string());
    }
    if value.is::<char>() {
        return HostValue::String(value.cast::<char>().to_string());
    }
    if value.is::<Array>() {
        return HostValue::List(
            value
                .cast::<Array>()
                .into_iter()
                .map(dynamic_to_host)
                .collect(),
        );
    }
    if value.is::<Map>() {
        return HostValue::Map(
            value
                .cast::<Map>()
                .into_iter()
                .map(|(key, value)| (key.to_string(), dynamic_to_host(value)))
                .collect(),
        );
    }
    if value.is::<ObjectRef>() {
        return HostValue::Object(value.cast::<ObjectRef>());
    }
    if value.is::<HostValue>() {
        return value.cast::<HostValue>();
    }
    HostValue::String(value.to_string())
}

/// Typed extraction of script results. Types without a conversion for a
/// given value fall back to `Default::default()`.
pub trait FromDynamic: Sized + Default {
    fn from_dynamic(_value: &Dynamic) -> Option<Self> {
        None
    }
}

pub fn from_dynamic<T: FromDynamic>(value: &Dynamic) -> T {
    T::from_dynamic(value).unwrap_or_default()
}

fn coerced(value: &Dynamic, kind: ValueKind) -> Option<HostValue> {
    dynamic_to_host(value.clone()).coerce(kind)
}

impl FromDynamic for i32 {
    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        coerced(value, ValueKind::Int)?.as_int()
    }
}

impl FromDynamic for f32 {
    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        coerced(value, ValueKind::Float)?.as_float()
    }
}

impl FromDynamic for f64 {
    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        f32::from_dynamic(value).map(f64::from)
    }
}

impl FromDynamic for bool {
    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        coerced(value, ValueKind::Bool)?.as_bool()
    }
}

impl FromDynamic for String {
    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        match dynamic_to_host(value.clone()) {
            HostValue::Null => None,
            HostValue::String(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}

impl FromDynamic for Option<ObjectRef> {
    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        value.clone().flatten().try_cast::<ObjectRef>().map(Some)
    }
}

impl FromDynamic for HostValue {
    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        Some(dynamic_to_host(value.clone()))
    }
}

impl FromDynamic for () {}
