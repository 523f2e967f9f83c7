//! Boolean overlays annotating a value tree.
//!
//! A sensitivity or unknown overlay mirrors the shape of the value it
//! annotates. A `true` anywhere, leaf or not, covers that whole subtree.

use serde_json::Value;

use super::types::PathSegment;

/// A borrowed position inside an overlay tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay<'a> {
    /// Nothing is flagged at or below this position.
    Absent,
    /// This position and everything below it is flagged.
    Blanket,
    /// A structured overlay node that may flag some descendants.
    Node(&'a Value),
}

impl<'a> Overlay<'a> {
    /// Wraps an overlay value.
    #[must_use]
    pub const fn new(value: &'a Value) -> Self {
        match value {
            Value::Bool(true) => Self::Blanket,
            Value::Object(_) | Value::Array(_) => Self::Node(value),
            _ => Self::Absent,
        }
    }

    /// Returns true if this position is flagged as a whole.
    #[must_use]
    pub const fn is_set(self) -> bool {
        matches!(self, Self::Blanket)
    }

    /// Returns true if this position or any descendant is flagged.
    #[must_use]
    pub fn covers_any(self) -> bool {
        match self {
            Self::Absent => false,
            Self::Blanket => true,
            Self::Node(value) => contains_true(value),
        }
    }

    /// Descends into a mapping key. A blanket stays a blanket.
    #[must_use]
    pub fn key(self, key: &str) -> Self {
        match self {
            Self::Blanket => Self::Blanket,
            Self::Node(Value::Object(map)) => map.get(key).map_or(Self::Absent, Self::new),
            _ => Self::Absent,
        }
    }

    /// Descends into a sequence index. A blanket stays a blanket.
    #[must_use]
    pub fn index(self, index: usize) -> Self {
        match self {
            Self::Blanket => Self::Blanket,
            Self::Node(Value::Array(items)) => items.get(index).map_or(Self::Absent, Self::new),
            _ => Self::Absent,
        }
    }

    /// Descends along a full path.
    #[must_use]
    pub fn at_path(self, path: &[PathSegment]) -> Self {
        path.iter().fold(self, |overlay, segment| match segment {
            PathSegment::Key(key) => overlay.key(key),
            PathSegment::Index(index) => overlay.index(*index),
        })
    }

    /// Returns the mapping keys flagged below this node.
    ///
    /// A blanket has no keys of its own; callers use the value tree's keys.
    #[must_use]
    pub fn flagged_keys(self) -> Vec<&'a str> {
        match self {
            Self::Node(Value::Object(map)) => map
                .iter()
                .filter(|(_, v)| contains_true(v))
                .map(|(k, _)| k.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn contains_true(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Array(items) => items.iter().any(contains_true),
        Value::Object(map) => map.values().any(contains_true),
        _ => false,
    }
}
