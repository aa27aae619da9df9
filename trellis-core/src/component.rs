//! Component records.

use crate::kind::Kind;
use crate::status::Status;
use crate::value::{Value, ValueMap};

/// A node in the configuration tree tagged with a kind and carrying
/// config, status, and value.
///
/// Components own their config by value; links between components are
/// expressed as [`Ref`](crate::value::Ref) values inside the config,
/// never as pointers. The system tree and the component's own path are
/// transient per-transition inputs handed to handlers separately; they
/// are not stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// The kind dispatching to a handler set.
    pub kind: Kind,
    /// Arbitrary parameters; may contain refs and nested components.
    pub config: ValueMap,
    /// Lifecycle status; `Absent` until the first transition.
    pub status: Status,
    /// Result of the last successful transition. Set while the component
    /// is running or suspended, unset otherwise.
    pub value: Option<Value>,
}

impl Component {
    /// Create a component of the given kind with an empty config.
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            config: ValueMap::new(),
            status: Status::Absent,
            value: None,
        }
    }

    /// Create an identity-kind component around a config map (the
    /// kind-defaulted constructor form).
    pub fn of(config: ValueMap) -> Self {
        Self::new(Kind::identity()).with_config(config)
    }

    /// Replace the config.
    #[must_use]
    pub fn with_config(mut self, config: ValueMap) -> Self {
        self.config = config;
        self
    }

    /// Insert one config entry.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Shallow-merge extra config entries over this component (the
    /// three-argument constructor form). Later entries win.
    #[must_use]
    pub fn merged(mut self, extra: ValueMap) -> Self {
        self.config.extend(extra);
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the value.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// True when the component is live (`init` or `resume`).
    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }
}
