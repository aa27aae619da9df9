//! The lifecycle runtime: handler registry, hooks, and the public
//! transitions.

use crate::engine;
use crate::handler::HandlerRegistry;
use crate::scheduler;
use crate::system::System;
use trellis_core::{Error, Path, Result, Transition};

/// Hook invoked with a human-readable line at can-run decisions.
pub type TraceHook = dyn Fn(&str) + Send + Sync;

/// Hook invoked when a transition fails mid-run. Receives the system as
/// it stood at the failure point and may repair it in place; the call
/// still returns the error afterwards.
pub type ErrorHook = dyn Fn(&mut System, &Error) + Send + Sync;

/// The lifecycle runtime.
///
/// Owns the handler registry and the two cross-cutting hooks; every
/// lifecycle call threads through it. Hooks live here rather than in
/// process-wide slots so independent runtimes stay independent.
pub struct Runtime {
    handlers: HandlerRegistry,
    tracer: Option<Box<TraceHook>>,
    error_hook: Option<Box<ErrorHook>>,
}

impl Runtime {
    /// Runtime over a handler registry, with no hooks installed.
    pub fn new(handlers: HandlerRegistry) -> Self {
        Self {
            handlers,
            tracer: None,
            error_hook: None,
        }
    }

    /// Install a trace hook.
    #[must_use]
    pub fn with_tracer(mut self, tracer: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.tracer = Some(Box::new(tracer));
        self
    }

    /// Install an exception hook.
    #[must_use]
    pub fn with_error_hook(
        mut self,
        hook: impl Fn(&mut System, &Error) + Send + Sync + 'static,
    ) -> Self {
        self.error_hook = Some(Box::new(hook));
        self
    }

    pub(crate) fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub(crate) fn trace(&self, message: &str) {
        if let Some(tracer) = &self.tracer {
            tracer(message);
        }
    }

    /// Initialize components in dependency order.
    ///
    /// With targets, touches the targets and their transitive
    /// dependencies; without, the whole system.
    pub fn init(&self, system: &mut System, targets: Option<&[Path]>) -> Result<()> {
        self.run(system, targets, Transition::Init)
    }

    /// Halt components in reverse dependency order.
    ///
    /// With targets, only the targets themselves transition; each one
    /// requires its transitive dependents to be halted (or absent)
    /// already.
    pub fn halt(&self, system: &mut System, targets: Option<&[Path]>) -> Result<()> {
        self.run(system, targets, Transition::Halt)
    }

    /// Suspend components in reverse dependency order, retaining values.
    pub fn suspend(&self, system: &mut System, targets: Option<&[Path]>) -> Result<()> {
        self.run(system, targets, Transition::Suspend)
    }

    /// Resume suspended components in dependency order.
    pub fn resume(&self, system: &mut System, targets: Option<&[Path]>) -> Result<()> {
        self.run(system, targets, Transition::Resume)
    }

    /// Resume, falling back to initialization for components that were
    /// never started; the can-run gate picks which step fires per path.
    pub fn resume_or_init(&self, system: &mut System, targets: Option<&[Path]>) -> Result<()> {
        let order = scheduler::plan(system.graph(), targets, Transition::Resume)?;
        tracing::debug!(paths = order.len(), "resume-or-init plan");
        let result = engine::run_resume_or_init(system, &order, self);
        self.route_failure(system, result)
    }

    fn run(&self, system: &mut System, targets: Option<&[Path]>, transition: Transition) -> Result<()> {
        let order = scheduler::plan(system.graph(), targets, transition)?;
        tracing::debug!(%transition, paths = order.len(), "transition plan");
        let result = engine::run_action(system, &order, transition, self);
        self.route_failure(system, result)
    }

    /// Route in-loop failures through the exception hook. Pre-flight
    /// errors abort before anything ran and bypass it.
    fn route_failure(&self, system: &mut System, result: Result<()>) -> Result<()> {
        if let Err(error) = &result {
            if !error.is_preflight() {
                match &self.error_hook {
                    Some(hook) => hook(system, error),
                    None => tracing::error!(%error, "transition failed"),
                }
            }
        }
        result
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("handlers", &self.handlers)
            .field("tracer", &self.tracer.is_some())
            .field("error_hook", &self.error_hook.is_some())
            .finish()
    }
}
