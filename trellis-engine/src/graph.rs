//! Dependency graph over component paths.

use crate::resolve;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use trellis_core::{tree, Error, Path, Result, Value};

/// A directed acyclic dependency graph whose nodes are component paths.
///
/// Kept in lock-step with the tree it was built from: exactly one node
/// per component, and transitions never change tree shape, so a graph
/// stays valid for the lifetime of its system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    nodes: BTreeSet<Path>,
    /// path → the paths it depends on.
    dependencies: BTreeMap<Path, BTreeSet<Path>>,
    /// path → the paths depending on it.
    dependents: BTreeMap<Path, BTreeSet<Path>>,
}

impl DependencyGraph {
    /// Build the graph for an expanded tree.
    ///
    /// One node per component; one edge per component enumerated under a
    /// resolved reference, plus an implicit edge to every component
    /// nested inside a config (its value must be fresh when the parent's
    /// config is substituted). Fails with [`Error::MissingDependency`] on
    /// unresolved references and [`Error::CyclicDependency`] on cycles.
    pub fn build(root: &Value) -> Result<Self> {
        let mut graph = Self::default();
        let components = tree::components(root);
        for (path, _) in &components {
            graph.add_node(path.clone());
        }

        for (path, component) in &components {
            for reference in tree::collect_refs(&component.config) {
                let base = resolve::resolve_ref(root, path, &reference)?;
                for target in resolve::components_under(root, &base) {
                    graph.add_edge(path.clone(), target);
                }
            }
            for nested in tree::nested_components(&component.config) {
                graph.add_edge(path.clone(), path.join_keys(nested.segments()));
            }
        }

        // cycle check up front, before any handler can run
        graph.topological_order()?;
        tracing::debug!(components = graph.len(), "dependency graph built");
        Ok(graph)
    }

    fn add_node(&mut self, path: Path) {
        self.dependencies.entry(path.clone()).or_default();
        self.dependents.entry(path.clone()).or_default();
        self.nodes.insert(path);
    }

    fn add_edge(&mut self, from: Path, to: Path) {
        self.dependencies.entry(from.clone()).or_default().insert(to.clone());
        self.dependents.entry(to).or_default().insert(from);
    }

    /// Whether a path is a component node.
    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.contains(path)
    }

    /// All component paths, in path order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.nodes.iter()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph has no components.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct dependencies of a path.
    pub fn dependencies_of(&self, path: &Path) -> impl Iterator<Item = &Path> {
        self.dependencies.get(path).into_iter().flatten()
    }

    /// Direct dependents of a path.
    pub fn dependents_of(&self, path: &Path) -> impl Iterator<Item = &Path> {
        self.dependents.get(path).into_iter().flatten()
    }

    /// Everything the seeds transitively depend on (seeds excluded).
    pub fn dependency_closure(&self, seeds: &[Path]) -> BTreeSet<Path> {
        self.closure(seeds, &self.dependencies)
    }

    /// Everything transitively depending on the seeds (seeds excluded).
    pub fn dependent_closure(&self, seeds: &[Path]) -> BTreeSet<Path> {
        self.closure(seeds, &self.dependents)
    }

    fn closure(&self, seeds: &[Path], edges: &BTreeMap<Path, BTreeSet<Path>>) -> BTreeSet<Path> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&Path> = seeds.iter().collect();
        while let Some(path) = queue.pop_front() {
            for next in edges.get(path).into_iter().flatten() {
                if seen.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Topological order, dependencies first (Kahn's algorithm).
    ///
    /// Deterministic: among ready nodes the smallest path goes first.
    /// Leftover nodes mean a cycle.
    pub fn topological_order(&self) -> Result<Vec<Path>> {
        let mut remaining: BTreeMap<&Path, usize> = self
            .nodes
            .iter()
            .map(|path| {
                (
                    path,
                    self.dependencies.get(path).map_or(0, BTreeSet::len),
                )
            })
            .collect();

        let mut ready: BTreeSet<&Path> = remaining
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(&path, _)| path)
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(path) = ready.pop_first() {
            sorted.push(path.clone());
            for dependent in self.dependents.get(path).into_iter().flatten() {
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let paths = self
                .nodes
                .iter()
                .filter(|path| !sorted.contains(path))
                .cloned()
                .collect();
            return Err(Error::CyclicDependency { paths });
        }

        Ok(sorted)
    }
}
