//! Analyzed plan report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::grouping::{ProviderGroup, ProviderGrouper};
use super::ranking::PriorityRanker;
use super::types::{ChangeStatistics, OutputChange, ResourceChange};

/// The complete analysis of one plan, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    /// When the analysis ran.
    pub generated_at: DateTime<Utc>,
    /// Plan document format version.
    pub format_version: String,
    /// Version of the tool that produced the plan.
    pub terraform_version: String,
    /// Resource changes, in plan order.
    pub resources: Vec<ResourceChange>,
    /// Output changes, by name.
    pub outputs: Vec<OutputChange>,
    /// Aggregate counts.
    pub statistics: ChangeStatistics,
}

impl PlanReport {
    /// Returns true if any resource or output changes.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.statistics.has_changes()
    }

    /// Returns the resources in risk-first display order.
    #[must_use]
    pub fn ranked_resources(&self) -> Vec<&ResourceChange> {
        PriorityRanker::new().rank(&self.resources)
    }

    /// Returns the dangerous resources in display order.
    #[must_use]
    pub fn dangerous_resources(&self) -> Vec<&ResourceChange> {
        self.ranked_resources()
            .into_iter()
            .filter(|r| r.is_dangerous)
            .collect()
    }

    /// Groups resources by provider, each group in risk-first order.
    ///
    /// Empty when the grouper declines to group.
    #[must_use]
    pub fn provider_groups(&self, grouper: &ProviderGrouper) -> Vec<ProviderGroup<'_>> {
        let ranker = PriorityRanker::new();
        let mut groups = grouper.group(&self.resources);
        for group in &mut groups {
            ranker.sort(&mut group.resources);
        }
        groups
    }

    /// Looks up a resource by address.
    #[must_use]
    pub fn resource(&self, address: &str) -> Option<&ResourceChange> {
        self.resources.iter().find(|r| r.address == address)
    }
}
