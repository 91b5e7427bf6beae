use std::collections::BTreeSet;

use hs_core::{HostValue, ObjectRef, PathExpression, PathSegment};

/// Hop limit for `explore`; keeps cyclic object graphs finite.
pub const MAX_EXPLORE_DEPTH: usize = 3;

pub fn get(root: &HostValue, path: &str) -> Option<HostValue> {
    let path = PathExpression::parse(path)?;
    get_segments(root, path.segments())
}

pub fn exists(root: &HostValue, path: &str) -> bool {
    get(root, path).is_some()
}

pub fn set(root: &mut HostValue, path: &str, value: HostValue) -> bool {
    let Some(path) = PathExpression::parse(path) else {
        return false;
    };
    if path.is_empty() {
        return false;
    }
    set_segments(root, path.segments(), value)
}

pub fn get_segments(current: &HostValue, segments: &[PathSegment]) -> Option<HostValue> {
    let Some((head, rest)) = segments.split_first() else {
        return (!current.is_null()).then(|| current.clone());
    };
    match current {
        HostValue::Object(object) => {
            let child = read_object_segment(object, head)?;
            get_segments(&child, rest)
        }
        HostValue::Map(entries) => match head {
            PathSegment::Member(key) | PathSegment::Key(key) => get_segments(entries.get(key)?, rest),
            PathSegment::Index(_) => None,
        },
        HostValue::List(items) => get_segments(items.get(list_index(head)?)?, rest),
        _ => None,
    }
}

pub fn set_segments(current: &mut HostValue, segments: &[PathSegment], value: HostValue) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        *current = value;
        return true;
    };
    match current {
        HostValue::Object(object) => set_object_segment(object, head, rest, value),
        HostValue::Map(entries) => {
            let key = match head {
                PathSegment::Member(key) | PathSegment::Key(key) => key,
                PathSegment::Index(_) => return false,
            };
            if rest.is_empty() {
                entries.insert(key.clone(), value);
                return true;
            }
            match entries.get_mut(key) {
                Some(child) => set_segments(child, rest, value),
                None => false,
            }
        }
        HostValue::List(items) => {
            let Some(index) = list_index(head) else {
                return false;
            };
            match items.get_mut(index) {
                Some(child) => set_segments(child, rest, value),
                None => false,
            }
        }
        _ => false,
    }
}

fn list_index(segment: &PathSegment) -> Option<usize> {
    match segment {
        PathSegment::Index(index) => Some(*index),
        PathSegment::Member(name) => name.parse().ok(),
        PathSegment::Key(_) => None,
    }
}

fn read_object_segment(object: &ObjectRef, segment: &PathSegment) -> Option<HostValue> {
    match segment {
        PathSegment::Member(name) | PathSegment::Key(name) => object.get(name),
        PathSegment::Index(_) => None,
    }
}

fn set_object_segment(
    object: &ObjectRef,
    head: &PathSegment,
    rest: &[PathSegment],
    value: HostValue,
) -> bool {
    let name = match head {
        PathSegment::Member(name) | PathSegment::Key(name) => name,
        PathSegment::Index(_) => return false,
    };
    if rest.is_empty() {
        return object.set(name, value);
    }

    let Some(mut child) = object.get(name) else {
        return false;
    };
    if !set_segments(&mut child, rest, value) {
        return false;
    }
    match child {
        // Shared objects were mutated in place.
        HostValue::Object(_) => true,
        // Lists and maps are values; store the edited copy back.
        other => object.set(name, other),
    }
}

/// Lists every path reachable from `root` within `MAX_EXPLORE_DEPTH` hops,
/// sorted and deduplicated. `shortcuts` are listed as top-level names even
/// though `root` does not own them.
pub fn explore(root: &HostValue, shortcuts: &[String]) -> Vec<String> {
    let mut found = shortcuts.iter().cloned().collect::<BTreeSet<_>>();
    let mut path = PathExpression::default();
    explore_into(root, &mut path, 0, &mut found);
    found.into_iter().collect()
}

fn explore_into(
    value: &HostValue,
    path: &mut PathExpression,
    depth: usize,
    found: &mut BTreeSet<String>,
) {
    if depth >= MAX_EXPLORE_DEPTH {
        return;
    }
    match value {
        HostValue::Object(object) => {
            for member in object.members().into_iter().filter(|member| member.is_data()) {
                let child = object.read().read(&member.name).unwrap_or_default();
                visit(PathSegment::Member(member.name), &child, path, depth, found);
            }
        }
        HostValue::Map(entries) => {
            for (key, child) in entries {
                // Root-map keys that are identifiers print bare, as the
                // variable names a context binds; other keys and nested maps
                // print as `["k"]`. Root-list elements always print as `[i]`.
                let segment = if path.is_empty() && is_plain_name(key) {
                    PathSegment::Member(key.clone())
                } else {
                    PathSegment::Key(key.clone())
                };
                visit(segment, child, path, depth, found);
            }
        }
        HostValue::List(items) => {
            for (index, child) in items.iter().enumerate() {
                visit(PathSegment::Index(index), child, path, depth, found);
            }
        }
        _ => {}
    }
}

fn is_plain_name(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with(|ch: char| ch.is_ascii_digit())
        && key.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

fn visit(
    segment: PathSegment,
    child: &HostValue,
    path: &mut PathExpression,
    depth: usize,
    found: &mut BTreeSet<String>,
) {
    path.push(segment);
    found.insert(path.to_string());
    if child.is_container() {
        explore_into(child, path, depth + 1, found);
    }
    path.pop();
}
