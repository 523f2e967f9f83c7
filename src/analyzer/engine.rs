//! Plan analyzer tying the classifiers together.
//!
//! One call to [`PlanAnalyzer::analyze`] is one synchronous pass: every
//! resource is diffed and classified exactly once, then statistics are
//! tallied over the finished list.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::plan::{ChangeType, Overlay, Plan, PlannedResourceChange};

use super::danger::DangerClassifier;
use super::diff::{DiffEngine, NodeOverlays};
use super::grouping::{ProviderCache, ProviderGrouper};
use super::replacement::ReplacementClassifier;
use super::report::PlanReport;
use super::statistics::StatisticsAggregator;
use super::types::{OutputChange, ResourceChange};

/// Analyzer turning a plan into a display-ready report.
#[derive(Debug)]
pub struct PlanAnalyzer {
    /// Analysis configuration.
    config: AnalysisConfig,
    /// Danger rule table.
    danger: DangerClassifier,
    /// Replacement classifier.
    replacement: ReplacementClassifier,
    /// Provider grouping with its shared cache.
    grouper: ProviderGrouper,
}

impl PlanAnalyzer {
    /// Creates an analyzer with its own provider cache.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_cache(config, Arc::new(ProviderCache::new()))
    }

    /// Creates an analyzer sharing an existing provider cache.
    #[must_use]
    pub fn with_cache(config: AnalysisConfig, cache: Arc<ProviderCache>) -> Self {
        Self {
            danger: DangerClassifier::new(&config),
            replacement: ReplacementClassifier::new(),
            grouper: ProviderGrouper::new(cache, config.grouping),
            config,
        }
    }

    /// Returns the provider grouper.
    #[must_use]
    pub const fn grouper(&self) -> &ProviderGrouper {
        &self.grouper
    }

    /// Analyzes a whole plan.
    #[must_use]
    pub fn analyze(&self, plan: &Plan) -> PlanReport {
        info!(
            resources = plan.resource_changes.len(),
            outputs = plan.output_changes.len(),
            "Analyzing plan"
        );

        let mut engine = DiffEngine::new(self.config.limits);
        let resources: Vec<ResourceChange> = plan
            .resource_changes
            .iter()
            .map(|resource| self.analyze_resource(&mut engine, resource))
            .collect();

        let outputs: Vec<OutputChange> = plan
            .output_changes
            .iter()
            .map(|(name, change)| OutputChange::from_change(name, change))
            .collect();

        let statistics = StatisticsAggregator::new().aggregate(&resources, &outputs);
        info!(
            to_add = statistics.to_add,
            to_change = statistics.to_change,
            to_destroy = statistics.to_destroy,
            replacements = statistics.replacements,
            high_risk = statistics.high_risk,
            "Plan analyzed"
        );

        PlanReport {
            generated_at: Utc::now(),
            format_version: plan.format_version.clone(),
            terraform_version: plan.terraform_version.clone(),
            resources,
            outputs,
            statistics,
        }
    }

    fn analyze_resource(&self, engine: &mut DiffEngine, resource: &PlannedResourceChange) -> ResourceChange {
        let change = &resource.change;
        let change_type = ChangeType::from_actions(&change.actions);

        let overlays = NodeOverlays::new(
            &change.before_sensitive,
            &change.after_sensitive,
            &change.after_unknown,
        );
        let mut property_changes = engine.analyze(&change.before, &change.after, overlays);

        self.replacement
            .mark_triggers(&mut property_changes, &change.replace_paths);
        let replacement_type = self.replacement.classify(
            change_type,
            &change.replace_paths,
            Overlay::new(&change.after_unknown),
        );

        let danger = self
            .danger
            .classify(&resource.resource_type, change_type, &property_changes);
        let risk_level = self.danger.risk_level(&resource.resource_type, change_type);

        let unknown_properties: Vec<String> = property_changes
            .changes
            .iter()
            .filter(|c| c.is_unknown)
            .map(|c| c.path_string())
            .collect();

        debug!(
            address = %resource.address,
            %change_type,
            properties = property_changes.count,
            dangerous = danger.is_dangerous,
            "Analyzed resource"
        );

        ResourceChange {
            address: resource.address.clone(),
            module_address: resource.module_address.clone(),
            resource_type: resource.resource_type.clone(),
            name: resource.name.clone(),
            provider: self.grouper.provider_for(&resource.resource_type),
            change_type,
            replacement_type,
            risk_level,
            is_dangerous: danger.is_dangerous,
            danger_reason: danger.reason,
            danger_properties: danger.properties,
            has_unknown_values: !unknown_properties.is_empty(),
            unknown_properties,
            property_changes,
        }
    }
}
