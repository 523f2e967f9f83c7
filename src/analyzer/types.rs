//! Result types produced by the analyzer.
//!
//! Every value here is built once per analysis pass and only read afterwards.
//! Sensitive and unknown placeholders are already substituted.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::plan::{ChangeType, PathSegment};

/// Placeholder shown instead of a sensitive value.
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive value)";
/// Placeholder shown instead of a value only known after apply.
pub const UNKNOWN_PLACEHOLDER: &str = "(known after apply)";

/// What happened to a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyAction {
    /// The property appears.
    Add,
    /// The property changes value.
    Update,
    /// The property disappears.
    Remove,
}

/// A single property-level change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyChange {
    /// Location of the property within the resource.
    pub path: Vec<PathSegment>,
    /// Last path segment, used for display and rule matching.
    pub name: String,
    /// What happened.
    pub action: PropertyAction,
    /// Display value before the change.
    pub before: Value,
    /// Display value after the change.
    pub after: Value,
    /// Whether either side is sensitive.
    pub sensitive: bool,
    /// Whether the after value is only known after apply.
    pub is_unknown: bool,
    /// Whether this change forces replacement of the resource.
    pub triggers_replacement: bool,
}

/// The ordered property changes of one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyChangeAnalysis {
    /// Changes sorted by lower-cased dotted path.
    pub changes: Vec<PropertyChange>,
    /// Number of recorded changes.
    pub count: usize,
    /// Whether a performance limit dropped changes.
    pub truncated: bool,
}

/// How a resource replacement is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementType {
    /// The resource is not replaced.
    Never,
    /// Replacement depends on values only known after apply.
    Conditional,
    /// The resource is definitely replaced.
    Always,
}

/// Coarse risk level shown in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Routine change.
    Low,
    /// Worth a second look.
    Medium,
    /// Likely disruptive.
    High,
    /// Destroys something flagged as sensitive.
    Critical,
}

/// The analyzed change of one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceChange {
    /// Full resource address.
    pub address: String,
    /// Enclosing module address, if any.
    pub module_address: Option<String>,
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name.
    pub name: String,
    /// Provider key derived from the resource type.
    pub provider: String,
    /// Resource-level change kind.
    pub change_type: ChangeType,
    /// How replacement is triggered.
    pub replacement_type: ReplacementType,
    /// Coarse risk level.
    pub risk_level: RiskLevel,
    /// Whether any danger rule fired.
    pub is_dangerous: bool,
    /// Combined reasons of every rule that fired.
    pub danger_reason: Option<String>,
    /// Sensitive properties that caused a danger rule to fire.
    pub danger_properties: Vec<String>,
    /// Whether any property is only known after apply.
    pub has_unknown_values: bool,
    /// Names of properties only known after apply.
    pub unknown_properties: Vec<String>,
    /// Property-level changes.
    pub property_changes: PropertyChangeAnalysis,
}

/// The analyzed change of one output value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputChange {
    /// Output name.
    pub name: String,
    /// Change kind.
    pub change_type: ChangeType,
    /// Whether either side is sensitive.
    pub sensitive: bool,
    /// Whether the after value is only known after apply.
    pub is_unknown: bool,
    /// Display value before the change.
    pub before: Value,
    /// Display value after the change.
    pub after: Value,
    /// Human-readable action label.
    pub action: String,
    /// Single-character indicator.
    pub indicator: String,
}

/// Aggregate counts over one plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeStatistics {
    /// Resources to create.
    pub to_add: usize,
    /// Resources to update in place.
    pub to_change: usize,
    /// Resources to delete.
    pub to_destroy: usize,
    /// Resources to replace.
    pub replacements: usize,
    /// Resources flagged as dangerous.
    pub high_risk: usize,
    /// Resources with no change.
    pub unmodified: usize,
    /// Resources with any change.
    pub total: usize,
    /// Outputs with any change.
    pub output_changes: usize,
}

impl PropertyChange {
    /// Returns the dotted path string, e.g. `tags.env`.
    #[must_use]
    pub fn path_string(&self) -> String {
        dotted_path(&self.path)
    }
}

impl PropertyChangeAnalysis {
    /// Returns true if no changes were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl ResourceChange {
    /// Returns true if this resource changes in any way.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.change_type != ChangeType::NoOp
    }
}

/// Joins path segments with dots.
#[must_use]
pub fn dotted_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

impl fmt::Display for PropertyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Remove => "remove",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for ReplacementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Never => "never",
            Self::Conditional => "conditional",
            Self::Always => "always",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for ResourceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.address, self.change_type)?;
        if let Some(reason) = &self.danger_reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}
