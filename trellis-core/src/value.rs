//! The configuration tree value model.
//!
//! A configuration is an in-memory tree of [`Value`] nodes: plain maps,
//! sequences and scalars pass through untouched, while components and
//! references are first-class tagged variants. The JSON interop at the
//! bottom of this module exists for terse authoring (`serde_json::json!`
//! literals with `trellis/…` tagged keys); it is a convenience over the
//! in-memory tree, not a persistence format.

use crate::component::Component;
use crate::error::{Error, Result};
use crate::kind::Kind;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Reserved tagged key marking a component and carrying its kind.
pub const KIND_KEY: &str = "trellis/kind";
/// Reserved tagged key carrying a component's status.
pub const STATUS_KEY: &str = "trellis/status";
/// Reserved tagged key carrying a component's value.
pub const VALUE_KEY: &str = "trellis/value";
/// Reserved tagged key marking a reference.
pub const REF_KEY: &str = "trellis/ref";

const RESERVED_PREFIX: &str = "trellis/";

/// Map node of the configuration tree.
///
/// A `BTreeMap` keeps traversal order deterministic.
pub type ValueMap = BTreeMap<String, Value>;

/// A lexically scoped symbolic pointer to another location in the tree.
///
/// A reference denotes "the value of the component found by resolving
/// this key sequence against the current scope".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref {
    keys: Vec<String>,
}

impl Ref {
    /// Reference through a single key.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            keys: vec![key.into()],
        }
    }

    /// Reference through a key sequence.
    pub fn path<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// The key sequence.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.keys.is_empty() || self.keys.iter().any(String::is_empty) {
            return Err(Error::InvalidConfig {
                reason: "reference with an empty key sequence".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref({})", self.keys.join("."))
    }
}

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An opaque scalar (null, bool, number, string).
    Scalar(JsonValue),
    /// A sequence. Never descended when flattening the tree.
    Seq(Vec<Value>),
    /// A nested map.
    Map(ValueMap),
    /// An embedded component.
    Component(Box<Component>),
    /// A reference to another location in the tree.
    Ref(Ref),
}

impl Value {
    /// The null scalar.
    pub fn null() -> Self {
        Value::Scalar(JsonValue::Null)
    }

    /// A boolean scalar.
    pub fn bool(v: bool) -> Self {
        Value::Scalar(JsonValue::Bool(v))
    }

    /// An integer scalar.
    pub fn int(v: i64) -> Self {
        Value::Scalar(JsonValue::Number(v.into()))
    }

    /// A string scalar.
    pub fn string(v: impl Into<String>) -> Self {
        Value::Scalar(JsonValue::String(v.into()))
    }

    /// An empty map.
    pub fn empty_map() -> Self {
        Value::Map(ValueMap::new())
    }

    /// Wrap a component.
    pub fn component(component: Component) -> Self {
        Value::Component(Box::new(component))
    }

    /// A reference through a single key.
    pub fn ref_to(key: impl Into<String>) -> Self {
        Value::Ref(Ref::key(key))
    }

    /// Check if the value is the null scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(JsonValue::Null))
    }

    /// View as a map.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// View as a component.
    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Value::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Mutable view as a component.
    pub fn as_component_mut(&mut self) -> Option<&mut Component> {
        match self {
            Value::Component(component) => Some(component),
            _ => None,
        }
    }

    /// View as a scalar string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(JsonValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// View as a scalar integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Scalar(JsonValue::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    /// Interpret a JSON document as a configuration tree.
    ///
    /// Objects carrying `trellis/kind` become components (the remaining
    /// entries are their config); `{"trellis/ref": …}` objects become
    /// references; everything else passes through structurally. Reserved
    /// keys anywhere else are malformed.
    pub fn from_json(json: JsonValue) -> Result<Self> {
        match json {
            JsonValue::Array(items) => Ok(Value::Seq(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_>>()?,
            )),
            JsonValue::Object(entries) => Self::from_json_object(entries),
            scalar => Ok(Value::Scalar(scalar)),
        }
    }

    fn from_json_object(entries: serde_json::Map<String, JsonValue>) -> Result<Self> {
        if entries.contains_key(REF_KEY) {
            if entries.len() != 1 {
                return Err(Error::InvalidConfig {
                    reason: "a reference object cannot carry other keys".to_string(),
                });
            }
            let raw = entries.into_iter().next().map(|(_, v)| v).unwrap_or_default();
            let reference = parse_ref_literal(raw)?;
            return Ok(Value::Ref(reference));
        }

        if let Some(kind_raw) = entries.get(KIND_KEY) {
            let kind_str = kind_raw.as_str().ok_or_else(|| Error::InvalidConfig {
                reason: format!("{} must be a string", KIND_KEY),
            })?;
            let mut component = Component::new(Kind::parse(kind_str)?);
            for (key, value) in entries {
                match key.as_str() {
                    KIND_KEY => {}
                    STATUS_KEY => {
                        component.status =
                            serde_json::from_value(value).map_err(|e| Error::InvalidConfig {
                                reason: format!("invalid {}: {}", STATUS_KEY, e),
                            })?;
                    }
                    VALUE_KEY => component.value = Some(Value::from_json(value)?),
                    _ if key.starts_with(RESERVED_PREFIX) => {
                        return Err(Error::InvalidConfig {
                            reason: format!("unknown reserved key '{}'", key),
                        });
                    }
                    _ => {
                        component.config.insert(key, Value::from_json(value)?);
                    }
                }
            }
            return Ok(Value::Component(Box::new(component)));
        }

        let mut map = ValueMap::new();
        for (key, value) in entries {
            if key.starts_with(RESERVED_PREFIX) {
                return Err(Error::InvalidConfig {
                    reason: format!("reserved key '{}' outside a component", key),
                });
            }
            map.insert(key, Value::from_json(value)?);
        }
        Ok(Value::Map(map))
    }

    /// Render the tree back to JSON with the reserved tagged keys.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Scalar(v) => v.clone(),
            Value::Seq(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                JsonValue::Object(entries)
            }
            Value::Ref(reference) => {
                let literal = if reference.keys().iter().any(|k| k.contains('.')) {
                    JsonValue::Array(
                        reference
                            .keys()
                            .iter()
                            .map(|k| JsonValue::String(k.clone()))
                            .collect(),
                    )
                } else {
                    JsonValue::String(reference.keys().join("."))
                };
                let mut entries = serde_json::Map::new();
                entries.insert(REF_KEY.to_string(), literal);
                JsonValue::Object(entries)
            }
            Value::Component(component) => {
                let mut entries = serde_json::Map::new();
                entries.insert(
                    KIND_KEY.to_string(),
                    JsonValue::String(component.kind.as_str().to_string()),
                );
                if !component.status.is_absent() {
                    // serializing a unit enum variant cannot fail
                    let status = serde_json::to_value(component.status)
                        .unwrap_or(JsonValue::Null);
                    entries.insert(STATUS_KEY.to_string(), status);
                }
                if let Some(value) = &component.value {
                    entries.insert(VALUE_KEY.to_string(), value.to_json());
                }
                for (key, value) in &component.config {
                    entries.insert(key.clone(), value.to_json());
                }
                JsonValue::Object(entries)
            }
        }
    }
}

fn parse_ref_literal(raw: JsonValue) -> Result<Ref> {
    let keys: Vec<String> = match raw {
        JsonValue::String(s) => s.split('.').map(str::to_string).collect(),
        JsonValue::Array(items) => items
            .into_iter()
            .map(|item| match item {
                JsonValue::String(s) => Ok(s),
                other => Err(Error::InvalidConfig {
                    reason: format!("reference key must be a string, got {}", other),
                }),
            })
            .collect::<Result<_>>()?,
        other => {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "{} must be a string or an array of strings, got {}",
                    REF_KEY, other
                ),
            });
        }
    };
    let reference = Ref { keys };
    reference.validate()?;
    Ok(reference)
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::bool(v)
    }
}

impl From<Component> for Value {
    fn from(component: Component) -> Self {
        Value::component(component)
    }
}

impl From<Ref> for Value {
    fn from(reference: Ref) -> Self {
        Value::Ref(reference)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = JsonValue::deserialize(deserializer)?;
        Value::from_json(json).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_pass_through() {
        let value = Value::from_json(json!({"port": 5432, "name": "db"})).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("port").and_then(Value::as_i64), Some(5432));
        assert_eq!(map.get("name").and_then(Value::as_str), Some("db"));
    }

    #[test]
    fn tagged_object_becomes_component() {
        let value = Value::from_json(json!({
            "trellis/kind": "db::postgres",
            "port": 5432,
        }))
        .unwrap();

        let component = value.as_component().unwrap();
        assert_eq!(component.kind, Kind::new("db", "postgres"));
        assert_eq!(
            component.config.get("port").and_then(Value::as_i64),
            Some(5432)
        );
        assert!(component.status.is_absent());
        assert!(component.value.is_none());
    }

    #[test]
    fn ref_literal_string_and_array() {
        let value = Value::from_json(json!({"trellis/ref": "group.db"})).unwrap();
        assert_eq!(value, Value::Ref(Ref::path(["group", "db"])));

        let value = Value::from_json(json!({"trellis/ref": ["group", "db"]})).unwrap();
        assert_eq!(value, Value::Ref(Ref::path(["group", "db"])));
    }

    #[test]
    fn ref_with_sibling_keys_is_invalid() {
        let result = Value::from_json(json!({"trellis/ref": "a", "other": 1}));
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn empty_ref_is_invalid() {
        let result = Value::from_json(json!({"trellis/ref": []}));
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn reserved_key_outside_component_is_invalid() {
        let result = Value::from_json(json!({"trellis/status": "init"}));
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn bad_kind_is_invalid() {
        let result = Value::from_json(json!({"trellis/kind": "postgres"}));
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn json_roundtrip() {
        let original = Value::from_json(json!({
            "group": {
                "db": {"trellis/kind": "db::postgres", "port": 5432},
                "cache": {"trellis/kind": "cache::redis", "db": {"trellis/ref": "db"}},
            },
            "names": ["a", "b"],
        }))
        .unwrap();

        let roundtripped = Value::from_json(original.to_json()).unwrap();
        assert_eq!(original, roundtripped);
    }

    #[test]
    fn component_state_roundtrips() {
        let value = Value::from_json(json!({
            "trellis/kind": "db::postgres",
            "trellis/status": "init",
            "trellis/value": {"pool": 4},
        }))
        .unwrap();

        let component = value.as_component().unwrap();
        assert_eq!(component.status, crate::status::Status::Init);
        assert!(component.value.is_some());

        let roundtripped = Value::from_json(value.to_json()).unwrap();
        assert_eq!(value, roundtripped);
    }

    #[test]
    fn ref_display() {
        assert_eq!(format!("{}", Ref::path(["group", "db"])), "ref(group.db)");
    }
}
