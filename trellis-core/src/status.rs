//! Component status and lifecycle transitions.
//!
//! The transition policy lives here as data: which statuses a transition
//! may run on, which statuses its graph neighbors must be in, and which
//! status it leaves behind. The engine consults these tables; it never
//! hard-codes a status check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a component.
///
/// `Absent` is the initial, unset state. `Resume` means "running after a
/// resume": the neighbor requirements rank it like `Init`, but the
/// can-run table treats the two separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Never transitioned.
    #[default]
    Absent,
    /// Running after `init`.
    Init,
    /// Stopped.
    Halt,
    /// Paused with its value retained.
    Suspend,
    /// Running after `resume`.
    Resume,
}

impl Status {
    /// True when the component is live (`init` or `resume`).
    pub fn is_running(self) -> bool {
        matches!(self, Status::Init | Status::Resume)
    }

    /// True for the unset state.
    pub fn is_absent(self) -> bool {
        matches!(self, Status::Absent)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Absent => "absent",
            Status::Init => "init",
            Status::Halt => "halt",
            Status::Suspend => "suspend",
            Status::Resume => "resume",
        };
        write!(f, "{}", name)
    }
}

/// A lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Start a component.
    Init,
    /// Stop a component.
    Halt,
    /// Pause a component, retaining its value.
    Suspend,
    /// Restart a suspended component.
    Resume,
}

/// Scheduling direction of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Dependencies before dependents (init, resume).
    Forward,
    /// Dependents before dependencies (halt, suspend).
    Reverse,
}

/// Which graph side a neighbor-status requirement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborSide {
    /// The components a path depends on.
    Dependency,
    /// The components depending on a path.
    Dependent,
}

impl fmt::Display for NeighborSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborSide::Dependency => write!(f, "dependency"),
            NeighborSide::Dependent => write!(f, "dependent"),
        }
    }
}

/// A set of statuses a neighbor must be in for a transition to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRequirement {
    /// No constraint.
    Any,
    /// Status must be one of the listed ones.
    OneOf(&'static [Status]),
}

impl StatusRequirement {
    /// Check a status against the requirement.
    pub fn allows(&self, status: Status) -> bool {
        match self {
            StatusRequirement::Any => true,
            StatusRequirement::OneOf(set) => set.contains(&status),
        }
    }
}

impl Transition {
    /// Statuses this transition is permitted to run on.
    ///
    /// Any other current status makes the engine skip the component
    /// silently (with a trace), never error.
    pub fn can_run_on(self, status: Status) -> bool {
        match self {
            Transition::Init => matches!(status, Status::Absent | Status::Halt),
            Transition::Halt => matches!(status, Status::Init | Status::Resume | Status::Suspend),
            Transition::Resume => matches!(status, Status::Suspend),
            Transition::Suspend => matches!(status, Status::Init | Status::Resume),
        }
    }

    /// Requirement on the transitive dependencies of a component.
    pub fn dependency_requirement(self) -> StatusRequirement {
        match self {
            Transition::Init | Transition::Resume => {
                StatusRequirement::OneOf(&[Status::Init, Status::Resume])
            }
            Transition::Halt | Transition::Suspend => StatusRequirement::Any,
        }
    }

    /// Requirement on the transitive dependents of a component.
    pub fn dependent_requirement(self) -> StatusRequirement {
        match self {
            Transition::Init | Transition::Resume => StatusRequirement::Any,
            Transition::Halt => StatusRequirement::OneOf(&[Status::Halt, Status::Absent]),
            Transition::Suspend => {
                StatusRequirement::OneOf(&[Status::Suspend, Status::Halt, Status::Absent])
            }
        }
    }

    /// The side whose requirement the engine checks: dependencies for
    /// forward transitions, dependents for reverse ones.
    pub fn checked_side(self) -> NeighborSide {
        match self.direction() {
            Direction::Forward => NeighborSide::Dependency,
            Direction::Reverse => NeighborSide::Dependent,
        }
    }

    /// Requirement on the checked side.
    pub fn neighbor_requirement(self) -> StatusRequirement {
        match self.checked_side() {
            NeighborSide::Dependency => self.dependency_requirement(),
            NeighborSide::Dependent => self.dependent_requirement(),
        }
    }

    /// Status a component ends up in after this transition succeeds.
    pub fn result_status(self) -> Status {
        match self {
            Transition::Init => Status::Init,
            Transition::Halt => Status::Halt,
            Transition::Suspend => Status::Suspend,
            Transition::Resume => Status::Resume,
        }
    }

    /// Scheduling direction.
    pub fn direction(self) -> Direction {
        match self {
            Transition::Init | Transition::Resume => Direction::Forward,
            Transition::Halt | Transition::Suspend => Direction::Reverse,
        }
    }

    /// Whether the handler's return value is stored. Halt discards it,
    /// keeping the invariant that a value is set only while the component
    /// is running or suspended.
    pub fn retains_value(self) -> bool {
        !matches!(self, Transition::Halt)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Init => "init",
            Transition::Halt => "halt",
            Transition::Suspend => "suspend",
            Transition::Resume => "resume",
        };
        write!(f, "{}", name)
    }
}
