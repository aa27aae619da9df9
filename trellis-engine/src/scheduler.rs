//! Transition scheduling over the dependency graph.

use crate::graph::DependencyGraph;
use std::collections::BTreeSet;
use trellis_core::{Direction, Error, Path, Result, Transition};

/// Compute the ordered list of paths a transition visits.
///
/// Untargeted calls visit every component. Forward targets pull in their
/// transitive dependencies (they must be running first). Reverse targets
/// are visited alone, in reverse topological order among themselves:
/// their dependents are *examined* by the engine's neighbor check, never
/// transitioned on their behalf.
pub fn plan(
    graph: &DependencyGraph,
    targets: Option<&[Path]>,
    transition: Transition,
) -> Result<Vec<Path>> {
    let full_order = graph.topological_order()?;

    let selected: Option<BTreeSet<Path>> = match targets {
        None => None,
        Some(targets) => {
            for target in targets {
                if !graph.contains(target) {
                    return Err(Error::UnknownComponent {
                        path: target.clone(),
                    });
                }
            }
            let mut set: BTreeSet<Path> = targets.iter().cloned().collect();
            if transition.direction() == Direction::Forward {
                set.extend(graph.dependency_closure(targets));
            }
            Some(set)
        }
    };

    let mut order: Vec<Path> = match selected {
        None => full_order,
        Some(set) => full_order
            .into_iter()
            .filter(|path| set.contains(path))
            .collect(),
    };

    if transition.direction() == Direction::Reverse {
        order.reverse();
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trellis_core::tree::expand;
    use trellis_core::Value;

    fn chain_graph() -> DependencyGraph {
        let root = expand(
            Value::from_json(json!({
                "a": {"trellis/kind": "t::k"},
                "b": {"trellis/kind": "t::k", "dep": {"trellis/ref": "a"}},
                "c": {"trellis/kind": "t::k", "dep": {"trellis/ref": "b"}},
            }))
            .unwrap(),
        )
        .unwrap();
        DependencyGraph::build(&root).unwrap()
    }

    #[test]
    fn untargeted_forward_is_full_topological_order() {
        let order = plan(&chain_graph(), None, Transition::Init).unwrap();
        assert_eq!(
            order,
            vec![Path::from("a"), Path::from("b"), Path::from("c")]
        );
    }

    #[test]
    fn untargeted_reverse_flips_the_order() {
        let order = plan(&chain_graph(), None, Transition::Halt).unwrap();
        assert_eq!(
            order,
            vec![Path::from("c"), Path::from("b"), Path::from("a")]
        );
    }

    #[test]
    fn forward_targets_pull_in_dependencies() {
        let order = plan(&chain_graph(), Some(&[Path::from("b")]), Transition::Init).unwrap();
        assert_eq!(order, vec![Path::from("a"), Path::from("b")]);
    }

    #[test]
    fn reverse_targets_stay_alone() {
        let order = plan(&chain_graph(), Some(&[Path::from("b")]), Transition::Halt).unwrap();
        assert_eq!(order, vec![Path::from("b")]);

        let order = plan(
            &chain_graph(),
            Some(&[Path::from("a"), Path::from("c")]),
            Transition::Halt,
        )
        .unwrap();
        assert_eq!(order, vec![Path::from("c"), Path::from("a")]);
    }

    #[test]
    fn unknown_target_rejected() {
        let result = plan(&chain_graph(), Some(&[Path::from("zz")]), Transition::Init);
        assert!(matches!(result, Err(Error::UnknownComponent { .. })));
    }
}
