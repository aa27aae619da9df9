//! Component paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered sequence of keys locating a component in the tree.
///
/// The empty path is the root; a one-element path is a top-level
/// component. Paths display dot-joined (`group.db`) and order
/// lexicographically by segment, which keeps graph traversals
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    /// The root path.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from key segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// A single-segment path.
    pub fn key(key: impl Into<String>) -> Self {
        Self(vec![key.into()])
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The key segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the path has no segments (same as [`Path::is_root`]).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// This path extended by one key.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.into());
        Self(segments)
    }

    /// This path extended by a key sequence.
    #[must_use]
    pub fn join_keys(&self, keys: &[String]) -> Self {
        let mut segments = self.0.clone();
        segments.extend(keys.iter().cloned());
        Self(segments)
    }

    /// The enclosing path, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.0.split_last() {
            Some((_, rest)) => Some(Self(rest.to_vec())),
            None => None,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}

impl From<&str> for Path {
    /// Split a dot-joined string into a path; the empty string is the root.
    fn from(s: &str) -> Self {
        Self(
            s.split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path() {
        let root = Path::root();
        assert!(root.is_root());
        assert_eq!(root.len(), 0);
        assert_eq!(root.parent(), None);
        assert_eq!(format!("{}", root), "<root>");
    }

    #[test]
    fn path_display() {
        let path = Path::new(["group", "db"]);
        assert_eq!(format!("{}", path), "group.db");
    }

    #[test]
    fn path_from_str() {
        let path = Path::from("group.db");
        assert_eq!(path.segments(), ["group", "db"]);
        assert!(Path::from("").is_root());
    }

    #[test]
    fn child_and_parent() {
        let path = Path::key("group").child("db");
        assert_eq!(path, Path::from("group.db"));
        assert_eq!(path.parent(), Some(Path::key("group")));
        assert_eq!(path.last(), Some("db"));
    }

    #[test]
    fn join_keys() {
        let scope = Path::key("group");
        let joined = scope.join_keys(&["db".to_string(), "pool".to_string()]);
        assert_eq!(joined, Path::from("group.db.pool"));
    }

    #[test]
    fn ordering_is_by_segment() {
        let mut paths = vec![Path::from("b"), Path::from("a.z"), Path::from("a")];
        paths.sort();
        assert_eq!(
            paths,
            vec![Path::from("a"), Path::from("a.z"), Path::from("b")]
        );
    }
}
