use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::object::ObjectRef;

const JSON_OBJECT_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Any,
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
    Object,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum HostValue {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    List(Vec<HostValue>),
    Map(BTreeMap<String, HostValue>),
    Object(ObjectRef),
}

impl HostValue {
    /// Converts an arbitrary host value. The supported scalar types map
    /// directly; anything else is carried as its string representation.
    pub fn from_display<T: Any + fmt::Display>(value: &T) -> Self {
        let any = value as &dyn Any;
        if let Some(value) = any.downcast_ref::<i32>() {
            return Self::Int(*value);
        }
        if let Some(value) = any.downcast_ref::<f32>() {
            return Self::Float(*value);
        }
        if let Some(value) = any.downcast_ref::<f64>() {
            return Self::Float(*value as f32);
        }
        if let Some(value) = any.downcast_ref::<bool>() {
            return Self::Bool(*value);
        }
        if let Some(value) = any.downcast_ref::<String>() {
            return Self::String(value.clone());
        }
        if let Some(value) = any.downcast_ref::<&'static str>() {
            return Self::String((*value).to_string());
        }
        if let Some(value) = any.downcast_ref::<ObjectRef>() {
            return Self::Object(value.clone());
        }
        if let Some(value) = any.downcast_ref::<HostValue>() {
            return value.clone();
        }
        Self::String(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_) | Self::Object(_))
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(value) => Some(value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// Converts the value to `kind`, or `None` when no sensible conversion
    /// exists.
    pub fn coerce(self, kind: ValueKind) -> Option<HostValue> {
        match kind {
            ValueKind::Any => Some(self),
            ValueKind::Int => match self {
                Self::Int(value) => Some(Self::Int(value)),
                Self::Float(value) => float_to_int(value).map(Self::Int),
                Self::Bool(value) => Some(Self::Int(i32::from(value))),
                Self::String(text) => {
                    let text = text.trim();
                    text.parse::<i32>()
                        .ok()
                        .or_else(|| {
                            text.parse::<f32>().ok().and_then(float_to_int)
                        })
                        .map(Self::Int)
                }
                _ => None,
            },
            ValueKind::Float => match self {
                Self::Float(value) => Some(Self::Float(value)),
                Self::Int(value) => Some(Self::Float(value as f32)),
                Self::Bool(value) => Some(Self::Float(if value { 1.0 } else { 0.0 })),
                Self::String(text) => text.trim().parse::<f32>().ok().map(Self::Float),
                _ => None,
            },
            ValueKind::Bool => match self {
                Self::Bool(value) => Some(Self::Bool(value)),
                Self::Int(value) => Some(Self::Bool(value != 0)),
                Self::Float(value) => Some(Self::Bool(value != 0.0)),
                Self::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(Self::Bool(true)),
                    "false" => Some(Self::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ValueKind::String => match self {
                Self::String(text) => Some(Self::String(text)),
                Self::Bool(_) | Self::Int(_) | Self::Float(_) => {
                    Some(Self::String(self.to_string()))
                }
                _ => None,
            },
            ValueKind::List => match self {
                Self::List(values) => Some(Self::List(values)),
                _ => None,
            },
            ValueKind::Map => match self {
                Self::Map(values) => Some(Self::Map(values)),
                _ => None,
            },
            ValueKind::Object => match self {
                Self::Object(object) => Some(Self::Object(object)),
                Self::Null => Some(Self::Null),
                _ => None,
            },
        }
    }

    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(value) => Self::Bool(value),
            JsonValue::Number(number) => match number.as_i64().map(i32::try_from) {
                Some(Ok(value)) => Self::Int(value),
                _ => Self::Float(number.as_f64().unwrap_or(0.0) as f32),
            },
            JsonValue::String(value) => Self::String(value),
            JsonValue::Array(values) => Self::List(values.into_iter().map(Self::from_json).collect()),
            JsonValue::Object(values) => Self::Map(
                values
                    .into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Snapshots the value as JSON. Host objects become maps of their
    /// readable members; object nesting is cut off at a fixed depth so cyclic
    /// graphs terminate.
    pub fn to_json(&self) -> JsonValue {
        self.to_json_at(0)
    }

    fn to_json_at(&self, object_depth: usize) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(value) => JsonValue::Bool(*value),
            Self::Int(value) => JsonValue::from(*value),
            Self::Float(value) => serde_json::Number::from_f64(f64::from(*value))
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::String(value) => JsonValue::String(value.clone()),
            Self::List(values) => JsonValue::Array(
                values
                    .iter()
                    .map(|value| value.to_json_at(object_depth))
                    .collect(),
            ),
            Self::Map(values) => JsonValue::Object(
                values
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json_at(object_depth)))
                    .collect(),
            ),
            Self::Object(object) => {
                if object_depth >= JSON_OBJECT_DEPTH {
                    return JsonValue::Null;
                }
                let mut out = serde_json::Map::new();
                for member in object.members().into_iter().filter(|member| member.is_data()) {
                    let value = object.read().read(&member.name).unwrap_or_default();
                    out.insert(member.name, value.to_json_at(object_depth + 1));
                }
                JsonValue::Object(out)
            }
        }
    }
}

/// Truncates toward zero; `None` for NaN and values outside the `i32` range.
/// `i32::MAX as f32` rounds up to 2^31, hence the exclusive upper bound.
fn float_to_int(value: f32) -> Option<i32> {
    let value = value.trunc();
    (value >= i32::MIN as f32 && value < i32::MAX as f32).then_some(value as i32)
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::String(value) => f.write_str(value),
            Self::List(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            Self::Map(values) => {
                f.write_str("#{")?;
                for (index, (key, value)) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Self::Object(object) => write!(f, "{}", object),
        }
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for HostValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Float(value as f32)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<ObjectRef> for HostValue {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(values: Vec<HostValue>) -> Self {
        Self::List(values)
    }
}

impl From<BTreeMap<String, HostValue>> for HostValue {
    fn from(values: BTreeMap<String, HostValue>) -> Self {
        Self::Map(values)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}
