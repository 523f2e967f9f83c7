//! Input contract types for execution plans.
//!
//! These structs mirror the machine-readable plan document. Every field
//! defaults so that partially populated documents still decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A value tree describing a before or after state.
pub type ValueTree = Value;

/// A complete execution plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    /// Plan document format version.
    pub format_version: String,
    /// Version of the tool that produced the plan.
    pub terraform_version: String,
    /// Proposed resource changes, in document order.
    pub resource_changes: Vec<PlannedResourceChange>,
    /// Proposed output changes, keyed by output name.
    pub output_changes: BTreeMap<String, Change>,
}

/// One resource's proposed change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannedResourceChange {
    /// Full resource address, unique within the plan.
    pub address: String,
    /// Address of the enclosing module, if any.
    pub module_address: Option<String>,
    /// Resource type, e.g. `aws_instance`.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name within its module.
    pub name: String,
    /// Fully qualified provider name.
    pub provider_name: String,
    /// Why the tool chose this action, when it says.
    pub action_reason: Option<String>,
    /// The before/after change description.
    pub change: Change,
}

/// A before/after change with its overlays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Change {
    /// Actions to perform, e.g. `["delete", "create"]`.
    pub actions: Vec<Action>,
    /// State before the change.
    pub before: ValueTree,
    /// State after the change.
    pub after: ValueTree,
    /// Overlay of values only known after apply.
    pub after_unknown: ValueTree,
    /// Overlay of sensitive values in `before`.
    pub before_sensitive: ValueTree,
    /// Overlay of sensitive values in `after`.
    pub after_sensitive: ValueTree,
    /// Property paths whose change forces replacement.
    pub replace_paths: Vec<Vec<PathSegment>>,
}

/// A single action in a change's action list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Create the object.
    Create,
    /// Read a data source.
    Read,
    /// Update in place.
    Update,
    /// Delete the object.
    Delete,
    /// Do nothing.
    NoOp,
    /// Any action this crate does not know about.
    #[serde(other)]
    Other,
}

/// One segment of a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Index into a sequence.
    Index(usize),
    /// Key into a mapping.
    Key(String),
}

/// The resource-level kind of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// A new object is created.
    Create,
    /// An existing object is updated in place.
    Update,
    /// An existing object is deleted.
    Delete,
    /// An existing object is destroyed and recreated.
    Replace,
    /// Nothing happens.
    NoOp,
}

impl ChangeType {
    /// Derives the change type from a plan action list.
    #[must_use]
    pub fn from_actions(actions: &[Action]) -> Self {
        match actions {
            [Action::Create] => Self::Create,
            [Action::Update] => Self::Update,
            [Action::Delete] => Self::Delete,
            [Action::Delete, Action::Create] | [Action::Create, Action::Delete] => Self::Replace,
            _ => Self::NoOp,
        }
    }

    /// Display priority: lower values are more disruptive and sort first.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Delete => 0,
            Self::Replace => 1,
            Self::Update => 2,
            Self::Create => 3,
            Self::NoOp => 4,
        }
    }

    /// Returns the human-readable action label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "Add",
            Self::Update => "Modify",
            Self::Delete => "Remove",
            Self::Replace => "Replace",
            Self::NoOp => "No change",
        }
    }

    /// Returns the single-character indicator used in listings.
    #[must_use]
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update => "~",
            Self::Delete => "-",
            Self::Replace => "±",
            Self::NoOp => " ",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Replace => "replace",
            Self::NoOp => "no-op",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => write!(f, "{k}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_from_actions() {
        assert_eq!(ChangeType::from_actions(&[Action::Create]), ChangeType::Create);
        assert_eq!(ChangeType::from_actions(&[Action::Update]), ChangeType::Update);
        assert_eq!(ChangeType::from_actions(&[Action::Delete]), ChangeType::Delete);
        assert_eq!(
            ChangeType::from_actions(&[Action::Delete, Action::Create]),
            ChangeType::Replace
        );
        assert_eq!(
            ChangeType::from_actions(&[Action::Create, Action::Delete]),
            ChangeType::Replace
        );
        assert_eq!(ChangeType::from_actions(&[Action::NoOp]), ChangeType::NoOp);
        assert_eq!(ChangeType::from_actions(&[Action::Read]), ChangeType::NoOp);
        assert_eq!(ChangeType::from_actions(&[]), ChangeType::NoOp);
    }

    #[test]
    fn test_actions_decode_with_unknown_variant() {
        let actions: Vec<Action> =
            serde_json::from_str(r#"["no-op", "forget"]"#).expect("actions should decode");
        assert_eq!(actions, vec![Action::NoOp, Action::Other]);
    }

    #[test]
    fn test_replace_paths_decode_mixed_segments() {
        let paths: Vec<Vec<PathSegment>> =
            serde_json::from_str(r#"[["ami"], ["network_interface", 0, "id"]]"#)
                .expect("paths should decode");
        assert_eq!(paths[0], vec![PathSegment::from("ami")]);
        assert_eq!(
            paths[1],
            vec![
                PathSegment::from("network_interface"),
                PathSegment::from(0),
                PathSegment::from("id"),
            ]
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let change: PlannedResourceChange =
            serde_json::from_str(r#"{"address": "aws_s3_bucket.logs"}"#).expect("should decode");
        assert_eq!(change.address, "aws_s3_bucket.logs");
        assert!(change.change.actions.is_empty());
        assert!(change.change.before.is_null());
    }
}
