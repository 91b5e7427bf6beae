use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;
use crate::value::HostValue;

pub const DEFAULT_MAX_OPERATIONS: u64 = 500_000;
pub const DEFAULT_MAX_CALL_LEVELS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeOptions {
    pub random_seed: Option<u32>,
    /// Upper bound on engine operations per call; `0` disables the guard.
    pub max_operations: u64,
    pub max_call_levels: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            random_seed: None,
            max_operations: DEFAULT_MAX_OPERATIONS,
            max_call_levels: DEFAULT_MAX_CALL_LEVELS,
        }
    }
}

impl RuntimeOptions {
    pub fn from_json_str(source: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(source)
            .map_err(|error| ScriptError::new("RUNTIME_OPTION_INVALID", error.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    vars: BTreeMap<String, HostValue>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<HostValue>,
    ) -> Option<HostValue> {
        self.vars.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.vars.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<HostValue> {
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HostValue)> {
        self.vars.iter()
    }
}

impl From<BTreeMap<String, HostValue>> for ExecutionContext {
    fn from(vars: BTreeMap<String, HostValue>) -> Self {
        Self { vars }
    }
}

impl FromIterator<(String, HostValue)> for ExecutionContext {
    fn from_iter<I: IntoIterator<Item = (String, HostValue)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Member(String),
    Key(String),
    Index(usize),
}

/// A parsed traversal route such as `Inner.Value`, `Items[0]` or
/// `Bag["k"].Count`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathExpression {
    segments: Vec<PathSegment>,
}

impl PathExpression {
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => flush_member(&mut current, &mut segments),
                '[' => {
                    flush_member(&mut current, &mut segments);
                    while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
                    match chars.peek().copied() {
                        Some(quote @ ('"' | '\'')) => {
                            chars.next();
                            let mut key = String::new();
                            loop {
                                match chars.next()? {
                                    '\\' => key.push(chars.next()?),
                                    ch if ch == quote => break,
                                    ch => key.push(ch),
                                }
                            }
                            while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
                            if chars.next()? != ']' {
                                return None;
                            }
                            segments.push(PathSegment::Key(key));
                        }
                        _ => {
                            let mut raw = String::new();
                            loop {
                                match chars.next()? {
                                    ']' => break,
                                    ch => raw.push(ch),
                                }
                            }
                            let raw = raw.trim();
                            if raw.is_empty() {
                                return None;
                            }
                            match raw.parse::<usize>() {
                                Ok(index) => segments.push(PathSegment::Index(index)),
                                Err(_) => segments.push(PathSegment::Key(raw.to_string())),
                            }
                        }
                    }
                }
                ']' => return None,
                ch => current.push(ch),
            }
        }
        flush_member(&mut current, &mut segments);

        Some(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }
}

fn flush_member(current: &mut String, segments: &mut Vec<PathSegment>) {
    let name = current.trim();
    if !name.is_empty() {
        segments.push(PathSegment::Member(name.to_string()));
    }
    current.clear();
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Member(name) => {
                    if index > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Key(key) => {
                    write!(f, "[\"{}\"]", key.replace('\\', "\\\\").replace('"', "\\\""))?;
                }
                PathSegment::Index(position) => write!(f, "[{}]", position)?,
            }
        }
        Ok(())
    }
}
