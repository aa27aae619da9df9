//! Trellis Engine Library
//!
//! The execution side of trellis: given an expanded configuration tree
//! from `trellis-core`, this crate resolves references, derives the
//! dependency graph, and performs lifecycle transitions (init, halt,
//! suspend, resume) over it in an order that respects dependencies while
//! enforcing per-transition preconditions on the state of neighbors.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use trellis_core::Value;
//! use trellis_engine::{HandlerRegistry, Runtime, System};
//!
//! # fn main() -> trellis_core::Result<()> {
//! let config = Value::from_json(json!({
//!     "answer": {"trellis/kind": "std::identity", "n": 42},
//!     "echo": {"trellis/kind": "std::identity", "src": {"trellis/ref": "answer"}},
//! }))?;
//!
//! let runtime = Runtime::new(HandlerRegistry::new());
//! let mut system = System::expand(config)?;
//! runtime.init(&mut system, None)?;
//! runtime.halt(&mut system, None)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
pub mod graph;
pub mod handler;
pub mod resolve;
pub mod runtime;
pub mod scheduler;
pub mod system;

// Re-export key types at crate root for convenience
pub use graph::DependencyGraph;
pub use handler::{from_fn, Handler, HandlerError, HandlerRegistry, HandlerResult, Identity, NodeContext};
pub use runtime::{ErrorHook, Runtime, TraceHook};
pub use system::System;
