//! Tree expansion and traversal.
//!
//! Traversal steps descend maps by key and components by config key;
//! sequences, scalars and refs are opaque. This is the addressing scheme
//! behind [`Path`]: a path is valid iff this traversal reaches a value.

use crate::component::Component;
use crate::error::Result;
use crate::kind::Kind;
use crate::path::Path;
use crate::value::{Ref, Value, ValueMap};
use std::collections::BTreeMap;

/// Apply the initial expansion to a configuration tree.
///
/// The auto-wrap rule: a plain-map entry whose key parses as a [`Kind`]
/// and whose value is itself a plain map becomes a component of that
/// kind. This runs exactly once, before the dependency graph exists, so
/// re-running a lifecycle call never re-wraps. Reference literals are
/// validated along the way.
pub fn expand(value: Value) -> Result<Value> {
    match value {
        Value::Map(map) => Ok(Value::Map(expand_entries(map)?)),
        Value::Seq(items) => Ok(Value::Seq(
            items.into_iter().map(expand).collect::<Result<_>>()?,
        )),
        Value::Component(mut component) => {
            let config = std::mem::take(&mut component.config);
            component.config = expand_entries(config)?;
            Ok(Value::Component(component))
        }
        Value::Ref(reference) => {
            reference.validate()?;
            Ok(Value::Ref(reference))
        }
        scalar => Ok(scalar),
    }
}

fn expand_entries(map: ValueMap) -> Result<ValueMap> {
    let mut out = ValueMap::new();
    for (key, child) in map {
        let child = expand(child)?;
        let child = match child {
            Value::Map(inner) if Kind::is_namespaced(&key) => Value::Component(Box::new(
                Component::new(Kind::parse(&key)?).with_config(inner),
            )),
            other => other,
        };
        out.insert(key, child);
    }
    Ok(out)
}

/// Produce the path → sub-tree mapping for every component and every
/// intermediate map, recursively descending maps and component configs
/// but never sequences.
pub fn flatten(root: &Value) -> BTreeMap<Path, &Value> {
    let mut out = BTreeMap::new();
    walk(root, Path::root(), &mut out);
    out
}

fn walk<'a>(value: &'a Value, path: Path, out: &mut BTreeMap<Path, &'a Value>) {
    match value {
        Value::Map(map) => {
            out.insert(path.clone(), value);
            for (key, child) in map {
                walk(child, path.child(key.clone()), out);
            }
        }
        Value::Component(component) => {
            out.insert(path.clone(), value);
            for (key, child) in &component.config {
                walk(child, path.child(key.clone()), out);
            }
        }
        _ => {}
    }
}

/// All components in the tree with their canonical paths, in path order.
pub fn components(root: &Value) -> Vec<(Path, &Component)> {
    flatten(root)
        .into_iter()
        .filter_map(|(path, value)| value.as_component().map(|c| (path, c)))
        .collect()
}

/// Look up the value at a path.
pub fn get<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = root;
    for key in path.segments() {
        current = match current {
            Value::Map(map) => map.get(key)?,
            Value::Component(component) => component.config.get(key)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable lookup of the value at a path.
pub fn get_mut<'a>(root: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut current = root;
    for key in path.segments() {
        current = match current {
            Value::Map(map) => map.get_mut(key)?,
            Value::Component(component) => component.config.get_mut(key)?,
            _ => return None,
        };
    }
    Some(current)
}

/// The component at a path, if any.
pub fn component_at<'a>(root: &'a Value, path: &Path) -> Option<&'a Component> {
    get(root, path).and_then(Value::as_component)
}

/// Mutable access to the component at a path, if any.
pub fn component_at_mut<'a>(root: &'a mut Value, path: &Path) -> Option<&'a mut Component> {
    get_mut(root, path).and_then(Value::as_component_mut)
}

/// Collect the references appearing anywhere inside a config, including
/// inside sub-maps and sequences, without descending into nested
/// components (those own their references).
pub fn collect_refs(config: &ValueMap) -> Vec<Ref> {
    let mut out = Vec::new();
    for value in config.values() {
        collect_refs_into(value, &mut out);
    }
    out
}

fn collect_refs_into(value: &Value, out: &mut Vec<Ref>) {
    match value {
        Value::Ref(reference) => out.push(reference.clone()),
        Value::Map(map) => {
            for child in map.values() {
                collect_refs_into(child, out);
            }
        }
        Value::Seq(items) => {
            for child in items {
                collect_refs_into(child, out);
            }
        }
        Value::Component(_) | Value::Scalar(_) => {}
    }
}

/// Relative paths of the components nested directly inside a config,
/// descending maps but stopping at each component found (its own nested
/// components are its concern).
pub fn nested_components(config: &ValueMap) -> Vec<Path> {
    let mut out = Vec::new();
    for (key, value) in config {
        nested_into(value, Path::key(key.clone()), &mut out);
    }
    out
}

fn nested_into(value: &Value, relative: Path, out: &mut Vec<Path>) {
    match value {
        Value::Component(_) => out.push(relative),
        Value::Map(map) => {
            for (key, child) in map {
                nested_into(child, relative.child(key.clone()), out);
            }
        }
        _ => {}
    }
}
