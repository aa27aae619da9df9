//! Error types for trellis.
//!
//! Strongly-typed errors with actionable context. Every variant carries
//! the identifiers (component path, kind, reference) needed to locate the
//! offending part of a configuration.

use crate::kind::Kind;
use crate::path::Path;
use crate::status::{NeighborSide, Status, Transition};
use crate::value::Ref;
use thiserror::Error;

/// The main error type for trellis operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // =========================================================================
    // Configuration errors (E0xx)
    // =========================================================================
    /// Malformed component, kind, or reference literal.
    #[error("E001: invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the malformation.
        reason: String,
    },

    // =========================================================================
    // Graph errors (E1xx)
    // =========================================================================
    /// A reference could not be resolved to any existing path.
    #[error("E101: unresolved reference {reference} in component {path}")]
    MissingDependency {
        /// The component whose config holds the reference.
        path: Path,
        /// The reference that failed to resolve.
        reference: Ref,
    },

    /// The dependency graph contains a cycle.
    #[error("E102: circular dependency involving: {}", format_paths(.paths))]
    CyclicDependency {
        /// The components left over after the topological sort.
        paths: Vec<Path>,
    },

    /// A target path does not name a component in the graph.
    #[error("E103: unknown component {path}")]
    UnknownComponent {
        /// The path that was requested.
        path: Path,
    },

    // =========================================================================
    // Dispatch errors (E2xx)
    // =========================================================================
    /// No handler is registered for a kind that a transition needs.
    #[error("E201: no handler registered for kind {kind}")]
    MissingHandler {
        /// The kind missing from the registry.
        kind: Kind,
    },

    // =========================================================================
    // Transition errors (E3xx)
    // =========================================================================
    /// A neighbor-status precondition failed.
    #[error("E301: cannot {transition} {path}: {side} {neighbor} is {status}")]
    WrongNeighborStatus {
        /// The transition being attempted.
        transition: Transition,
        /// The component being transitioned.
        path: Path,
        /// Which side of the graph the neighbor sits on.
        side: NeighborSide,
        /// The offending neighbor.
        neighbor: Path,
        /// The neighbor's current status.
        status: Status,
    },

    /// A handler raised an error during a transition.
    #[error("E302: {transition} failed at {path} ({kind}): {cause}")]
    Action {
        /// The transition that was running.
        transition: Transition,
        /// The component whose handler failed.
        path: Path,
        /// The component's kind.
        kind: Kind,
        /// Reason for the failure.
        cause: String,
    },
}

fn format_paths(paths: &[Path]) -> String {
    paths
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Get the error code (e.g., "E101").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "E001",
            Self::MissingDependency { .. } => "E101",
            Self::CyclicDependency { .. } => "E102",
            Self::UnknownComponent { .. } => "E103",
            Self::MissingHandler { .. } => "E201",
            Self::WrongNeighborStatus { .. } => "E301",
            Self::Action { .. } => "E302",
        }
    }

    /// Check if this error is raised before any handler runs.
    ///
    /// Pre-flight errors abort a lifecycle call with the system untouched;
    /// everything else is raised from inside the transition loop.
    #[must_use]
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingDependency { .. }
                | Self::CyclicDependency { .. }
                | Self::UnknownComponent { .. }
                | Self::MissingHandler { .. }
        )
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        let err = Error::UnknownComponent {
            path: Path::from("db"),
        };
        assert_eq!(err.code(), "E103");

        let err = Error::MissingHandler {
            kind: Kind::identity(),
        };
        assert_eq!(err.code(), "E201");
    }

    #[test]
    fn error_display() {
        let err = Error::WrongNeighborStatus {
            transition: Transition::Halt,
            path: Path::from("a"),
            side: NeighborSide::Dependent,
            neighbor: Path::from("b"),
            status: Status::Init,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("E301"));
        assert!(msg.contains("dependent"));
        assert!(msg.contains("init"));
    }

    #[test]
    fn cyclic_display_lists_paths() {
        let err = Error::CyclicDependency {
            paths: vec![Path::from("a"), Path::from("b")],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("a, b"));
    }

    #[test]
    fn preflight_classification() {
        assert!(
            Error::InvalidConfig {
                reason: "bad".to_string()
            }
            .is_preflight()
        );

        assert!(
            !Error::Action {
                transition: Transition::Init,
                path: Path::from("a"),
                kind: Kind::identity(),
                cause: "boom".to_string(),
            }
            .is_preflight()
        );
    }
}
