//! The expanded system: configuration tree plus dependency graph.

use crate::graph::DependencyGraph;
use trellis_core::{tree, Component, Path, Result, Status, Value};

/// An expanded configuration tree annotated with its dependency graph.
///
/// The two stay in lock-step: the graph holds exactly one node per
/// component in the tree, and transitions only mutate component state
/// (status, value), never tree shape. A component leaves the system only
/// when the whole system is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    tree: Value,
    graph: DependencyGraph,
}

impl System {
    /// Expand a configuration into a system.
    ///
    /// Applies the auto-wrap rule and builds the dependency graph. All
    /// pre-flight errors (malformed literals, unresolved references,
    /// cycles) surface here, before any handler can run.
    pub fn expand(config: Value) -> Result<Self> {
        let tree = tree::expand(config)?;
        let graph = DependencyGraph::build(&tree)?;
        Ok(Self { tree, graph })
    }

    /// The expanded tree.
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// The dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The component at a path.
    pub fn component(&self, path: &Path) -> Option<&Component> {
        tree::component_at(&self.tree, path)
    }

    /// A component's status, or `None` if the path is not a component.
    pub fn status(&self, path: &Path) -> Option<Status> {
        self.component(path).map(|component| component.status)
    }

    /// A component's current value.
    pub fn value(&self, path: &Path) -> Option<&Value> {
        self.component(path).and_then(|component| component.value.as_ref())
    }

    /// All component paths, in path order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.graph.paths()
    }

    /// Consume the system, returning the tree.
    pub fn into_tree(self) -> Value {
        self.tree
    }

    /// Store the outcome of a successful transition on one component.
    pub(crate) fn apply(&mut self, path: &Path, status: Status, value: Option<Value>) {
        if let Some(component) = tree::component_at_mut(&mut self.tree, path) {
            component.status = status;
            component.value = value;
        }
    }
}
