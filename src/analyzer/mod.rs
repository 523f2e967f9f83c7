//! Change analysis module.
//!
//! This module turns a plan into classified, display-ready changes: the deep
//! diff of each resource, replacement and danger classification, aggregate
//! statistics, provider grouping, and risk-first ordering.

mod types;
mod diff;
mod replacement;
mod danger;
mod statistics;
mod grouping;
mod ranking;
mod outputs;
mod report;
mod engine;

pub use types::{
    ChangeStatistics, OutputChange, PropertyAction, PropertyChange, PropertyChangeAnalysis,
    ReplacementType, ResourceChange, RiskLevel, SENSITIVE_PLACEHOLDER, UNKNOWN_PLACEHOLDER,
    dotted_path,
};
pub use diff::{DiffEngine, NodeOverlays, estimate_size};
pub use replacement::ReplacementClassifier;
pub use danger::{DangerAssessment, DangerClassifier, DangerContext};
pub use statistics::StatisticsAggregator;
pub use grouping::{ProviderCache, ProviderGroup, ProviderGrouper, UNKNOWN_PROVIDER};
pub use ranking::PriorityRanker;
pub use report::PlanReport;
pub use engine::PlanAnalyzer;
