//! Common handlers and helpers for lifecycle tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use trellis_core::{Kind, Transition, Value};
use trellis_engine::{Handler, HandlerRegistry, HandlerResult, NodeContext};

/// Shared log of `(transition, path)` events in execution order.
pub type Log = Arc<Mutex<Vec<(Transition, String)>>>;

/// A handler that records every operation it runs.
///
/// `init`/`resume` return the resolved config (like the identity kind),
/// so substituted values are observable in tests.
pub struct Recording {
    pub log: Log,
}

impl Handler for Recording {
    fn init(&self, node: &NodeContext<'_>) -> HandlerResult {
        self.record(Transition::Init, node);
        Ok(node.config_value())
    }

    fn halt(&self, node: &NodeContext<'_>) -> HandlerResult {
        self.record(Transition::Halt, node);
        Ok(Value::null())
    }

    fn suspend(&self, node: &NodeContext<'_>) -> HandlerResult {
        self.record(Transition::Suspend, node);
        Ok(node.value().cloned().unwrap_or_else(Value::null))
    }

    fn resume(&self, node: &NodeContext<'_>) -> HandlerResult {
        self.record(Transition::Resume, node);
        Ok(node.config_value())
    }
}

impl Recording {
    fn record(&self, transition: Transition, node: &NodeContext<'_>) {
        self.log
            .lock()
            .unwrap()
            .push((transition, node.path().to_string()));
    }
}

/// A handler whose suspend leaves a marker that resume insists on.
pub struct Checkpoint;

impl Handler for Checkpoint {
    fn init(&self, _node: &NodeContext<'_>) -> HandlerResult {
        Ok(Value::string("started"))
    }

    fn suspend(&self, _node: &NodeContext<'_>) -> HandlerResult {
        Ok(Value::string("checkpoint"))
    }

    fn resume(&self, node: &NodeContext<'_>) -> HandlerResult {
        if node.value().and_then(|v| v.as_str()) == Some("checkpoint") {
            Ok(Value::string("resumed"))
        } else {
            Err("resume without a checkpoint".into())
        }
    }
}

/// A handler that always fails to start.
pub struct FailOnInit;

impl Handler for FailOnInit {
    fn init(&self, _node: &NodeContext<'_>) -> HandlerResult {
        Err("deliberate failure".into())
    }
}

/// Build a registry with a [`Recording`] handler for each kind, sharing
/// one log.
pub fn recording_registry(kinds: &[&str]) -> (HandlerRegistry, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    for kind in kinds {
        registry.register(
            Kind::parse(kind).unwrap(),
            Recording { log: log.clone() },
        );
    }
    (registry, log)
}

/// Snapshot the recorded events.
pub fn events(log: &Log) -> Vec<(Transition, String)> {
    log.lock().unwrap().clone()
}
