//! The transition engine.
//!
//! One path at a time: can-run gate, neighbor-status check, config
//! substitution, handler dispatch, state update. The loop stops at the
//! first failure; paths already visited keep their new state.

use crate::handler::NodeContext;
use crate::resolve;
use crate::runtime::Runtime;
use crate::system::System;
use trellis_core::{Error, NeighborSide, Path, Result, StatusRequirement, Transition};

/// Run one transition over an ordered list of paths.
pub(crate) fn run_action(
    system: &mut System,
    order: &[Path],
    transition: Transition,
    runtime: &Runtime,
) -> Result<()> {
    check_handlers(system, order, runtime)?;
    for path in order {
        step(system, path, transition, runtime)?;
    }
    Ok(())
}

/// Run a resume step then an init step back-to-back on each path; the
/// can-run gate decides which of the two actually fires.
pub(crate) fn run_resume_or_init(
    system: &mut System,
    order: &[Path],
    runtime: &Runtime,
) -> Result<()> {
    check_handlers(system, order, runtime)?;
    for path in order {
        step(system, path, Transition::Resume, runtime)?;
        step(system, path, Transition::Init, runtime)?;
    }
    Ok(())
}

/// Verify every kind a plan visits has a registered handler. A missing
/// handler is a fatal configuration error, raised before anything runs.
fn check_handlers(system: &System, order: &[Path], runtime: &Runtime) -> Result<()> {
    for path in order {
        if let Some(component) = system.component(path) {
            if !runtime.handlers().contains(&component.kind) {
                return Err(Error::MissingHandler {
                    kind: component.kind.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Apply one transition to one path. Returns whether it actually ran.
fn step(
    system: &mut System,
    path: &Path,
    transition: Transition,
    runtime: &Runtime,
) -> Result<bool> {
    let (kind, status, config, current_value) = {
        let component = system
            .component(path)
            .ok_or_else(|| Error::UnknownComponent { path: path.clone() })?;
        (
            component.kind.clone(),
            component.status,
            component.config.clone(),
            component.value.clone(),
        )
    };

    if !transition.can_run_on(status) {
        runtime.trace(&format!("skip {} {}: status {}", transition, path, status));
        tracing::debug!(%path, %transition, %status, "transition skipped");
        return Ok(false);
    }
    runtime.trace(&format!("run {} {}", transition, path));

    check_neighbors(system, path, transition)?;

    let result = {
        let tree = system.tree();
        let resolved = resolve::resolve_config(tree, path, &config)?;
        let node = NodeContext::new(resolved, path, tree, status, current_value.as_ref());
        let handler = runtime
            .handlers()
            .get(&kind)
            .ok_or_else(|| Error::MissingHandler { kind: kind.clone() })?;
        let invoked = match transition {
            Transition::Init => handler.init(&node),
            Transition::Halt => handler.halt(&node),
            Transition::Suspend => handler.suspend(&node),
            Transition::Resume => handler.resume(&node),
        };
        invoked.map_err(|cause| Error::Action {
            transition,
            path: path.clone(),
            kind: kind.clone(),
            cause: cause.to_string(),
        })?
    };

    let stored = transition.retains_value().then_some(result);
    system.apply(path, transition.result_status(), stored);
    tracing::debug!(%path, %transition, "transition applied");
    Ok(true)
}

/// Enforce the neighbor-status requirement on the checked side: the
/// transitive dependencies for forward transitions, the transitive
/// dependents for reverse ones.
fn check_neighbors(system: &System, path: &Path, transition: Transition) -> Result<()> {
    let requirement = transition.neighbor_requirement();
    if requirement == StatusRequirement::Any {
        return Ok(());
    }

    let side = transition.checked_side();
    let neighbors = match side {
        NeighborSide::Dependency => system.graph().dependency_closure(std::slice::from_ref(path)),
        NeighborSide::Dependent => system.graph().dependent_closure(std::slice::from_ref(path)),
    };

    for neighbor in neighbors {
        let status = system.status(&neighbor).unwrap_or_default();
        if !requirement.allows(status) {
            return Err(Error::WrongNeighborStatus {
                transition,
                path: path.clone(),
                side,
                neighbor,
                status,
            });
        }
    }
    Ok(())
}
