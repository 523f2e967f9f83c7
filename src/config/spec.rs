//! Configuration specification types for the plan summarizer.
//!
//! These structs map to the `planlens.yaml` file. Every section is optional;
//! an empty file yields the same configuration as [`AnalysisConfig::default`].

use serde::{Deserialize, Serialize};

/// Default cap on recorded property changes per resource.
pub const DEFAULT_MAX_PROPERTIES_PER_RESOURCE: usize = 100;
/// Default cap on the estimated size of a single property change, in bytes.
pub const DEFAULT_MAX_PROPERTY_SIZE: usize = 10 * 1024;
/// Default cap on the estimated size of all property changes in one pass, in bytes.
pub const DEFAULT_MAX_TOTAL_MEMORY: usize = 100 * 1024 * 1024;
/// Default cap on value-tree recursion depth.
pub const DEFAULT_MAX_DEPENDENCY_DEPTH: usize = 10;
/// Resource count at which grouping kicks in when no threshold is configured.
pub const DEFAULT_GROUPING_THRESHOLD: usize = 10;

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Resource types whose deletion or replacement is considered high risk.
    pub sensitive_resources: Vec<SensitiveResource>,
    /// Properties whose modification is considered high risk.
    pub sensitive_properties: Vec<SensitiveProperty>,
    /// Bounds applied while diffing.
    pub limits: PerformanceLimits,
    /// Provider grouping settings.
    pub grouping: GroupingConfig,
}

/// A resource type flagged as sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensitiveResource {
    /// Full resource type, e.g. `aws_db_instance`.
    pub resource_type: String,
}

/// A (resource type, property) pair flagged as sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensitiveProperty {
    /// Full resource type, e.g. `aws_instance`.
    pub resource_type: String,
    /// Top-level property name, e.g. `user_data`.
    pub property: String,
}

/// Bounds on the work done for a single plan. A value of `0` disables that bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PerformanceLimits {
    /// Maximum property changes recorded for one resource.
    pub max_properties_per_resource: usize,
    /// Maximum estimated size of one property change.
    pub max_property_size: usize,
    /// Maximum estimated size of all property changes in one analysis pass.
    pub max_total_memory: usize,
    /// Maximum nesting depth walked before a subtree is compared as a unit.
    pub max_dependency_depth: usize,
}

/// Provider grouping settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GroupingConfig {
    /// Whether grouping is allowed at all.
    pub enabled: bool,
    /// Minimum resource count before grouping applies. `0` means the default.
    pub threshold: usize,
}

impl Default for PerformanceLimits {
    fn default() -> Self {
        Self {
            max_properties_per_resource: DEFAULT_MAX_PROPERTIES_PER_RESOURCE,
            max_property_size: DEFAULT_MAX_PROPERTY_SIZE,
            max_total_memory: DEFAULT_MAX_TOTAL_MEMORY,
            max_dependency_depth: DEFAULT_MAX_DEPENDENCY_DEPTH,
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_GROUPING_THRESHOLD,
        }
    }
}

impl GroupingConfig {
    /// Returns the threshold to apply, substituting the default for zero.
    #[must_use]
    pub const fn effective_threshold(&self) -> usize {
        if self.threshold == 0 {
            DEFAULT_GROUPING_THRESHOLD
        } else {
            self.threshold
        }
    }
}

impl AnalysisConfig {
    /// Adds a sensitive resource type.
    #[must_use]
    pub fn with_sensitive_resource(mut self, resource_type: impl Into<String>) -> Self {
        self.sensitive_resources.push(SensitiveResource {
            resource_type: resource_type.into(),
        });
        self
    }

    /// Adds a sensitive (resource type, property) pair.
    #[must_use]
    pub fn with_sensitive_property(
        mut self,
        resource_type: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        self.sensitive_properties.push(SensitiveProperty {
            resource_type: resource_type.into(),
            property: property.into(),
        });
        self
    }

    /// Replaces the grouping settings.
    #[must_use]
    pub fn with_grouping(mut self, enabled: bool, threshold: usize) -> Self {
        self.grouping = GroupingConfig { enabled, threshold };
        self
    }

    /// Replaces the performance limits.
    #[must_use]
    pub fn with_limits(mut self, limits: PerformanceLimits) -> Self {
        self.limits = limits;
        self
    }
}
