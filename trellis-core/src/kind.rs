//! Namespaced kind identifiers.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A namespaced symbolic identifier used for handler dispatch.
///
/// Kinds follow the `namespace::name` convention (e.g. `svc::http_server`,
/// `std::identity`). The namespace is mandatory; a bare name does not
/// parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Kind(String);

impl Kind {
    /// Separator between namespace and name.
    pub const SEPARATOR: &'static str = "::";

    /// Create a kind from a namespace and a name.
    pub fn new(namespace: impl AsRef<str>, name: impl AsRef<str>) -> Self {
        Self(format!(
            "{}{}{}",
            namespace.as_ref(),
            Self::SEPARATOR,
            name.as_ref()
        ))
    }

    /// Parse a `namespace::name` string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(Self::SEPARATOR) {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() => Ok(Self(s.to_string())),
            _ => Err(Error::InvalidConfig {
                reason: format!("kind '{}' is not namespaced (expected namespace::name)", s),
            }),
        }
    }

    /// The built-in identity kind.
    #[must_use]
    pub fn identity() -> Self {
        Self("std::identity".to_string())
    }

    /// True if this is the built-in identity kind.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.0 == "std::identity"
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        self.0
            .split_once(Self::SEPARATOR)
            .map_or("", |(ns, _)| ns)
    }

    /// The name part.
    pub fn name(&self) -> &str {
        self.0
            .split_once(Self::SEPARATOR)
            .map_or(self.0.as_str(), |(_, name)| name)
    }

    /// The full `namespace::name` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a raw map key is a namespaced kind.
    ///
    /// This drives the auto-wrap rule during initial expansion: a plain
    /// map under such a key becomes a component of that kind.
    pub fn is_namespaced(key: &str) -> bool {
        Self::parse(key).is_ok()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Kind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> String {
        kind.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_creation() {
        let kind = Kind::new("svc", "http_server");
        assert_eq!(kind.as_str(), "svc::http_server");
        assert_eq!(kind.namespace(), "svc");
        assert_eq!(kind.name(), "http_server");
    }

    #[test]
    fn kind_parse() {
        let kind = Kind::parse("db::postgres").unwrap();
        assert_eq!(kind.namespace(), "db");
        assert_eq!(kind.name(), "postgres");
    }

    #[test]
    fn kind_parse_rejects_bare_names() {
        assert!(Kind::parse("postgres").is_err());
        assert!(Kind::parse("::postgres").is_err());
        assert!(Kind::parse("db::").is_err());
        assert!(Kind::parse("").is_err());
    }

    #[test]
    fn identity_kind() {
        let kind = Kind::identity();
        assert!(kind.is_identity());
        assert_eq!(kind.as_str(), "std::identity");
        assert!(!Kind::new("std", "other").is_identity());
    }

    #[test]
    fn namespaced_key_check() {
        assert!(Kind::is_namespaced("svc::db"));
        assert!(!Kind::is_namespaced("db"));
        assert!(!Kind::is_namespaced("::db"));
    }

    #[test]
    fn kind_display_roundtrip() {
        let kind = Kind::new("cache", "redis");
        let parsed = Kind::parse(&kind.to_string()).unwrap();
        assert_eq!(kind, parsed);
    }
}
