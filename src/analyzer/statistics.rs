//! Aggregate counts over an analyzed plan.

use crate::plan::ChangeType;

use super::types::{ChangeStatistics, OutputChange, ResourceChange};

/// Single-pass tally of resource and output changes.
#[derive(Debug, Default)]
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// Creates a new aggregator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Counts resources by change type and outputs that change.
    ///
    /// `total + unmodified` always equals `resources.len()`.
    #[must_use]
    pub fn aggregate(&self, resources: &[ResourceChange], outputs: &[OutputChange]) -> ChangeStatistics {
        let mut stats = ChangeStatistics::default();

        for resource in resources {
            match resource.change_type {
                ChangeType::Create => stats.to_add += 1,
                ChangeType::Update => stats.to_change += 1,
                ChangeType::Delete => stats.to_destroy += 1,
                ChangeType::Replace => stats.replacements += 1,
                ChangeType::NoOp => stats.unmodified += 1,
            }
            if resource.is_dangerous {
                stats.high_risk += 1;
            }
        }

        stats.total = stats.to_add + stats.to_change + stats.to_destroy + stats.replacements;
        stats.output_changes = outputs
            .iter()
            .filter(|o| o.change_type != ChangeType::NoOp)
            .count();

        stats
    }
}

impl ChangeStatistics {
    /// Returns true if any resource or output changes.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.total > 0 || self.output_changes > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::types::{PropertyChangeAnalysis, ReplacementType, RiskLevel};
    use serde_json::Value;

    fn resource(change_type: ChangeType, is_dangerous: bool) -> ResourceChange {
        ResourceChange {
            address: String::from("null_resource.x"),
            module_address: None,
            resource_type: String::from("null_resource"),
            name: String::from("x"),
            provider: String::from("null"),
            change_type,
            replacement_type: ReplacementType::Never,
            risk_level: RiskLevel::Low,
            is_dangerous,
            danger_reason: None,
            danger_properties: vec![],
            has_unknown_values: false,
            unknown_properties: vec![],
            property_changes: PropertyChangeAnalysis::default(),
        }
    }

    fn output(change_type: ChangeType) -> OutputChange {
        OutputChange {
            name: String::from("out"),
            change_type,
            sensitive: false,
            is_unknown: false,
            before: Value::Null,
            after: Value::Null,
            action: change_type.label().to_string(),
            indicator: change_type.indicator().to_string(),
        }
    }

    #[test]
    fn test_counts_by_change_type() {
        let resources = vec![
            resource(ChangeType::Create, false),
            resource(ChangeType::Create, false),
            resource(ChangeType::Update, false),
            resource(ChangeType::Delete, true),
            resource(ChangeType::Replace, true),
            resource(ChangeType::NoOp, false),
        ];
        let outputs = vec![output(ChangeType::Update), output(ChangeType::NoOp)];

        let stats = StatisticsAggregator::new().aggregate(&resources, &outputs);

        assert_eq!(stats.to_add, 2);
        assert_eq!(stats.to_change, 1);
        assert_eq!(stats.to_destroy, 1);
        assert_eq!(stats.replacements, 1);
        assert_eq!(stats.high_risk, 2);
        assert_eq!(stats.unmodified, 1);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.output_changes, 1);
        assert!(stats.has_changes());
    }

    #[test]
    fn test_totals_conserve_resources() {
        let kinds = [
            ChangeType::Create,
            ChangeType::Update,
            ChangeType::Delete,
            ChangeType::Replace,
            ChangeType::NoOp,
        ];
        let resources: Vec<ResourceChange> = (0..23)
            .map(|i| resource(kinds[i % kinds.len()], i % 4 == 0))
            .collect();

        let stats = StatisticsAggregator::new().aggregate(&resources, &[]);
        assert_eq!(stats.total + stats.unmodified, resources.len());
    }

    #[test]
    fn test_empty_plan() {
        let stats = StatisticsAggregator::new().aggregate(&[], &[]);
        assert_eq!(stats, ChangeStatistics::default());
        assert!(!stats.has_changes());
    }
}
