//! Lexical reference resolution and config substitution.
//!
//! A reference resolves against its holder's path: try `scope ++ keys`,
//! drop the last scope segment, retry, until the scope is exhausted. The
//! resolved base may be a single component or an enclosing map holding
//! many; [`components_under`] enumerates what a reference actually pulls
//! in.

use trellis_core::tree;
use trellis_core::{Error, Path, Ref, Result, Value, ValueMap};

/// Reference chains longer than this are treated as circular.
const MAX_REF_DEPTH: usize = 64;

/// Resolve a reference against a scope using the lexical rule.
///
/// Fails with [`Error::MissingDependency`] once the scope is exhausted
/// without a hit.
pub fn resolve_ref(root: &Value, scope: &Path, reference: &Ref) -> Result<Path> {
    let mut cursor = Some(scope.clone());
    while let Some(current) = cursor {
        let candidate = current.join_keys(reference.keys());
        if tree::get(root, &candidate).is_some() {
            return Ok(candidate);
        }
        cursor = current.parent();
    }
    Err(Error::MissingDependency {
        path: scope.clone(),
        reference: reference.clone(),
    })
}

/// Enumerate the component paths a resolved base pulls in.
///
/// A component yields itself; a map yields every component reachable
/// under it through nested maps, stopping at each component found.
/// Anything else yields nothing.
pub fn components_under(root: &Value, base: &Path) -> Vec<Path> {
    let mut out = Vec::new();
    if let Some(value) = tree::get(root, base) {
        collect_under(value, base.clone(), &mut out);
    }
    out
}

fn collect_under(value: &Value, path: Path, out: &mut Vec<Path>) {
    match value {
        Value::Component(_) => out.push(path),
        Value::Map(map) => {
            for (key, child) in map {
                collect_under(child, path.child(key.clone()), out);
            }
        }
        _ => {}
    }
}

/// Resolve a component's config for handler consumption: every ref is
/// replaced by the value view of its target, and nested components are
/// replaced by their current values.
pub fn resolve_config(root: &Value, scope: &Path, config: &ValueMap) -> Result<ValueMap> {
    let mut out = ValueMap::new();
    for (key, value) in config {
        out.insert(key.clone(), substitute(root, scope, value, 0)?);
    }
    Ok(out)
}

/// The value view of a tree node: components collapse to their current
/// values (null if unset), containers recurse, scalars pass through.
/// Refs resolve against the scope of the region they sit in.
fn substitute(root: &Value, scope: &Path, value: &Value, depth: usize) -> Result<Value> {
    match value {
        Value::Ref(reference) => {
            if depth >= MAX_REF_DEPTH {
                return Err(Error::InvalidConfig {
                    reason: format!(
                        "reference chain through {} exceeds depth limit {}",
                        reference, MAX_REF_DEPTH
                    ),
                });
            }
            let target = resolve_ref(root, scope, reference)?;
            match tree::get(root, &target) {
                Some(found) => substitute(root, &target, found, depth + 1),
                None => Err(Error::MissingDependency {
                    path: scope.clone(),
                    reference: reference.clone(),
                }),
            }
        }
        Value::Component(component) => {
            Ok(component.value.clone().unwrap_or_else(Value::null))
        }
        Value::Map(map) => {
            let mut out = ValueMap::new();
            for (key, child) in map {
                out.insert(key.clone(), substitute(root, scope, child, depth)?);
            }
            Ok(Value::Map(out))
        }
        Value::Seq(items) => Ok(Value::Seq(
            items
                .iter()
                .map(|child| substitute(root, scope, child, depth))
                .collect::<Result<_>>()?,
        )),
        Value::Scalar(scalar) => Ok(Value::Scalar(scalar.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trellis_core::tree::expand;

    fn tree(json: serde_json::Value) -> Value {
        expand(Value::from_json(json).unwrap()).unwrap()
    }

    #[test]
    fn resolves_sibling_at_top_level() {
        let root = tree(json!({
            "a": {"trellis/kind": "test::a"},
            "b": {"trellis/kind": "test::b", "dep": {"trellis/ref": "a"}},
        }));

        let resolved = resolve_ref(&root, &Path::from("b"), &Ref::key("a")).unwrap();
        assert_eq!(resolved, Path::from("a"));
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let root = tree(json!({
            "a": {"trellis/kind": "test::a"},
            "group": {
                "a": {"trellis/kind": "test::inner"},
                "b": {"trellis/kind": "test::b", "dep": {"trellis/ref": "a"}},
            },
        }));

        let resolved = resolve_ref(&root, &Path::from("group.b"), &Ref::key("a")).unwrap();
        assert_eq!(resolved, Path::from("group.a"));
    }

    #[test]
    fn walks_up_to_the_root() {
        let root = tree(json!({
            "shared": {"trellis/kind": "test::shared"},
            "group": {
                "nested": {
                    "b": {"trellis/kind": "test::b"},
                },
            },
        }));

        let resolved =
            resolve_ref(&root, &Path::from("group.nested.b"), &Ref::key("shared")).unwrap();
        assert_eq!(resolved, Path::from("shared"));
    }

    #[test]
    fn own_config_entry_is_the_nearest_scope() {
        let root = tree(json!({
            "port": 1,
            "b": {"trellis/kind": "test::b", "port": 8080},
        }));

        let resolved = resolve_ref(&root, &Path::from("b"), &Ref::key("port")).unwrap();
        assert_eq!(resolved, Path::from("b.port"));
    }

    #[test]
    fn unresolved_reference_is_missing_dependency() {
        let root = tree(json!({
            "b": {"trellis/kind": "test::b"},
        }));

        let result = resolve_ref(&root, &Path::from("b"), &Ref::key("nope"));
        assert!(matches!(result, Err(Error::MissingDependency { .. })));
    }

    #[test]
    fn components_under_component_and_map() {
        let root = tree(json!({
            "db": {"trellis/kind": "svc::db"},
            "group": {
                "x": {"trellis/kind": "svc::x"},
                "deep": {"y": {"trellis/kind": "svc::y"}},
                "scalar": 1,
            },
        }));

        assert_eq!(
            components_under(&root, &Path::from("db")),
            vec![Path::from("db")]
        );

        let mut under_group = components_under(&root, &Path::from("group"));
        under_group.sort();
        assert_eq!(
            under_group,
            vec![Path::from("group.deep.y"), Path::from("group.x")]
        );

        assert!(components_under(&root, &Path::from("group.scalar")).is_empty());
    }

    #[test]
    fn substitution_uses_current_values() {
        let mut root = tree(json!({
            "a": {"trellis/kind": "test::a"},
            "b": {"trellis/kind": "test::b", "dep": {"trellis/ref": "a"}, "n": 3},
        }));
        tree::component_at_mut(&mut root, &Path::from("a"))
            .unwrap()
            .value = Some(Value::string("live"));

        let config = tree::component_at(&root, &Path::from("b")).unwrap().config.clone();
        let resolved = resolve_config(&root, &Path::from("b"), &config).unwrap();

        assert_eq!(resolved.get("dep"), Some(&Value::string("live")));
        assert_eq!(resolved.get("n").and_then(Value::as_i64), Some(3));
    }

    #[test]
    fn substitution_collapses_referenced_maps() {
        let mut root = tree(json!({
            "group": {
                "x": {"trellis/kind": "svc::x"},
                "note": "plain",
            },
            "user": {"trellis/kind": "svc::user", "all": {"trellis/ref": "group"}},
        }));
        tree::component_at_mut(&mut root, &Path::from("group.x"))
            .unwrap()
            .value = Some(Value::int(7));

        let config = tree::component_at(&root, &Path::from("user")).unwrap().config.clone();
        let resolved = resolve_config(&root, &Path::from("user"), &config).unwrap();

        let all = resolved.get("all").and_then(Value::as_map).unwrap();
        assert_eq!(all.get("x"), Some(&Value::int(7)));
        assert_eq!(all.get("note"), Some(&Value::string("plain")));
    }

    #[test]
    fn circular_bare_refs_hit_the_depth_limit() {
        let root = tree(json!({
            "m": {"x": {"trellis/ref": "x"}},
            "user": {"trellis/kind": "svc::user", "v": {"trellis/ref": "m.x"}},
        }));

        let config = tree::component_at(&root, &Path::from("user")).unwrap().config.clone();
        let result = resolve_config(&root, &Path::from("user"), &config);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
