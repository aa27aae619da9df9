//! Handler dispatch.
//!
//! A handler implements the four lifecycle operations for one kind. Only
//! `init` is mandatory; the other three default into each other the way
//! most components want: `halt` keeps the current value, `suspend`
//! delegates to `halt`, `resume` delegates to `init`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use trellis_core::{Kind, Path, Status, Value, ValueMap};

/// Any error a handler can raise; the engine wraps it into
/// [`Error::Action`](trellis_core::Error::Action).
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one handler operation.
pub type HandlerResult = std::result::Result<Value, HandlerError>;

/// The view of a component a handler receives: the resolved config plus
/// the transient fields (own path, full system tree, current state).
///
/// The config has every ref and nested component substituted by its
/// value; the tree is the whole system, read-only. Neither survives the
/// transition call.
#[derive(Debug)]
pub struct NodeContext<'a> {
    config: ValueMap,
    path: &'a Path,
    system: &'a Value,
    status: Status,
    value: Option<&'a Value>,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(
        config: ValueMap,
        path: &'a Path,
        system: &'a Value,
        status: Status,
        value: Option<&'a Value>,
    ) -> Self {
        Self {
            config,
            path,
            system,
            status,
            value,
        }
    }

    /// The resolved config.
    pub fn config(&self) -> &ValueMap {
        &self.config
    }

    /// One resolved config entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// The component's own path.
    pub fn path(&self) -> &Path {
        self.path
    }

    /// The full system tree.
    pub fn system(&self) -> &Value {
        self.system
    }

    /// Status before this transition.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Value produced by the last successful transition.
    pub fn value(&self) -> Option<&Value> {
        self.value
    }

    /// The resolved config as a map value (what the identity kind
    /// returns from `init`).
    pub fn config_value(&self) -> Value {
        Value::Map(self.config.clone())
    }
}

/// User logic for one kind, one operation per transition.
pub trait Handler: Send + Sync {
    /// Start the component; the return value becomes its value.
    fn init(&self, node: &NodeContext<'_>) -> HandlerResult;

    /// Stop the component. The engine discards the returned value.
    fn halt(&self, node: &NodeContext<'_>) -> HandlerResult {
        Ok(node.value().cloned().unwrap_or_else(Value::null))
    }

    /// Pause the component; the return value is retained as its value.
    fn suspend(&self, node: &NodeContext<'_>) -> HandlerResult {
        self.halt(node)
    }

    /// Restart a suspended component.
    fn resume(&self, node: &NodeContext<'_>) -> HandlerResult {
        self.init(node)
    }
}

/// The built-in identity kind: `init` returns the resolved config
/// itself, making inert data composable as a component.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Handler for Identity {
    fn init(&self, node: &NodeContext<'_>) -> HandlerResult {
        Ok(node.config_value())
    }
}

/// Wrap a plain function as an init-only handler; the other operations
/// keep their defaults.
pub fn from_fn<F>(init: F) -> impl Handler
where
    F: Fn(&NodeContext<'_>) -> HandlerResult + Send + Sync,
{
    struct FnHandler<F>(F);

    impl<F> Handler for FnHandler<F>
    where
        F: Fn(&NodeContext<'_>) -> HandlerResult + Send + Sync,
    {
        fn init(&self, node: &NodeContext<'_>) -> HandlerResult {
            (self.0)(node)
        }
    }

    FnHandler(init)
}

/// Mapping from kind to handler set.
///
/// Pre-registers the built-in `std::identity` kind.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<Kind, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create a registry holding only the built-in kinds.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };
        registry.register(Kind::identity(), Identity);
        registry
    }

    /// Register a handler for a kind, replacing any previous one.
    pub fn register(&mut self, kind: Kind, handler: impl Handler + 'static) {
        self.handlers.insert(kind, Arc::new(handler));
    }

    /// Builder-style registration.
    #[must_use]
    pub fn with_handler(mut self, kind: Kind, handler: impl Handler + 'static) -> Self {
        self.register(kind, handler);
        self
    }

    /// Look up the handler for a kind.
    pub fn get(&self, kind: &Kind) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(kind)
    }

    /// Whether a kind is registered.
    pub fn contains(&self, kind: &Kind) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &Kind> {
        self.handlers.keys()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("HandlerRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
