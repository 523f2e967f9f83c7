//! Danger classification for resource changes.
//!
//! Rules live in an ordered table. Each rule is evaluated independently and
//! the reasons of every rule that fires are joined with " and ", in table
//! order. Nothing outside the table marks a resource dangerous.

use std::collections::HashSet;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::plan::{ChangeType, PathSegment};

use super::types::{PropertyChange, PropertyChangeAnalysis, RiskLevel};

/// Outcome of danger classification for one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DangerAssessment {
    /// Whether any rule fired.
    pub is_dangerous: bool,
    /// Combined reason, when dangerous.
    pub reason: Option<String>,
    /// Sensitive properties that were matched.
    pub properties: Vec<String>,
}

/// Everything a rule may look at.
#[derive(Debug)]
pub struct DangerContext<'a> {
    /// Resource type.
    pub resource_type: &'a str,
    /// Resource-level change kind.
    pub change_type: ChangeType,
    /// Whether the type is in the sensitive-type set.
    pub sensitive_type: bool,
    /// Distinct sensitive properties changed, in path order.
    pub matched_properties: &'a [String],
}

/// One entry of the rule table.
struct DangerRule {
    priority: u8,
    name: &'static str,
    evaluate: fn(&DangerContext<'_>) -> Option<String>,
}

const RULES: &[DangerRule] = &[
    DangerRule {
        priority: 1,
        name: "deletion",
        evaluate: deletion_reason,
    },
    DangerRule {
        priority: 2,
        name: "sensitive-replacement",
        evaluate: replacement_reason,
    },
    DangerRule {
        priority: 3,
        name: "sensitive-property",
        evaluate: property_reason,
    },
];

/// Resource type keywords mapped to replacement reasons, checked in order.
///
/// A keyword matches whole `_`-separated tokens of the type, so `lb` matches
/// `aws_lb` but not `aws_lambda_function`.
const REPLACEMENT_KEYWORDS: &[(&[&str], &str)] = &[
    (
        &[
            "db", "database", "rds", "sql", "mysql", "postgresql", "mssql", "dynamodb",
            "cosmosdb", "redis", "elasticache",
        ],
        "Database replacement",
    ),
    (&["instance", "virtual_machine", "vm"], "Compute instance replacement"),
    (&["s3", "bucket", "storage", "volume", "disk", "efs"], "Storage replacement"),
    (&["security_group", "firewall", "security_rule"], "Security rule replacement"),
    (
        &["vpc", "subnet", "network", "route", "gateway", "load_balancer", "lb", "alb", "elb"],
        "Network infrastructure replacement",
    ),
];

/// Classifier applying the danger rule table.
#[derive(Debug, Default)]
pub struct DangerClassifier {
    /// Resource types flagged as sensitive.
    sensitive_types: HashSet<String>,
    /// (resource type, property) pairs flagged as sensitive.
    sensitive_properties: HashSet<(String, String)>,
}

impl DangerClassifier {
    /// Creates a classifier from the configured sensitive sets.
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            sensitive_types: config
                .sensitive_resources
                .iter()
                .map(|r| r.resource_type.clone())
                .collect(),
            sensitive_properties: config
                .sensitive_properties
                .iter()
                .map(|p| (p.resource_type.clone(), p.property.clone()))
                .collect(),
        }
    }

    /// Returns true if the resource type is in the sensitive-type set.
    #[must_use]
    pub fn is_sensitive_type(&self, resource_type: &str) -> bool {
        self.sensitive_types.contains(resource_type)
    }

    /// Applies every rule and combines the reasons of those that fire.
    #[must_use]
    pub fn classify(
        &self,
        resource_type: &str,
        change_type: ChangeType,
        analysis: &PropertyChangeAnalysis,
    ) -> DangerAssessment {
        let matched = if matches!(change_type, ChangeType::Update | ChangeType::Replace) {
            self.matched_properties(resource_type, &analysis.changes)
        } else {
            Vec::new()
        };

        let context = DangerContext {
            resource_type,
            change_type,
            sensitive_type: self.is_sensitive_type(resource_type),
            matched_properties: &matched,
        };

        let reasons: Vec<String> = RULES
            .iter()
            .filter_map(|rule| {
                let reason = (rule.evaluate)(&context)?;
                debug!(rule = rule.name, priority = rule.priority, resource_type, %reason, "Danger rule fired");
                Some(reason)
            })
            .collect();

        if reasons.is_empty() {
            return DangerAssessment::default();
        }

        DangerAssessment {
            is_dangerous: true,
            reason: Some(reasons.join(" and ")),
            properties: matched,
        }
    }

    /// Returns the coarse risk level for summary display.
    #[must_use]
    pub fn risk_level(&self, resource_type: &str, change_type: ChangeType) -> RiskLevel {
        match (change_type, self.is_sensitive_type(resource_type)) {
            (ChangeType::Delete, true) => RiskLevel::Critical,
            (ChangeType::Delete, false) | (ChangeType::Replace, true) => RiskLevel::High,
            (ChangeType::Replace, false) | (ChangeType::Update, true) => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    fn matched_properties(&self, resource_type: &str, changes: &[PropertyChange]) -> Vec<String> {
        let mut matched: Vec<String> = Vec::new();

        for change in changes {
            let top_level = match change.path.first() {
                Some(PathSegment::Key(key)) => Some(key.as_str()),
                _ => None,
            };
            let hit = [top_level, Some(change.name.as_str())]
                .into_iter()
                .flatten()
                .find(|property| self.is_sensitive_property(resource_type, property));

            if let Some(property) = hit
                && !matched.iter().any(|m| m == property)
            {
                matched.push(property.to_string());
            }
        }

        matched
    }

    fn is_sensitive_property(&self, resource_type: &str, property: &str) -> bool {
        self.sensitive_properties
            .contains(&(resource_type.to_string(), property.to_string()))
    }
}

fn deletion_reason(context: &DangerContext<'_>) -> Option<String> {
    if context.change_type != ChangeType::Delete {
        return None;
    }
    Some(String::from(if context.sensitive_type {
        "Sensitive resource deletion"
    } else {
        "Resource deletion"
    }))
}

fn replacement_reason(context: &DangerContext<'_>) -> Option<String> {
    if context.change_type != ChangeType::Replace || !context.sensitive_type {
        return None;
    }
    let reason =
        replacement_category(context.resource_type).unwrap_or("Sensitive resource replacement");
    Some(reason.to_string())
}

/// Returns the replacement reason of the first keyword group matching the type.
fn replacement_category(resource_type: &str) -> Option<&'static str> {
    let lower = resource_type.to_lowercase();
    let tokens: Vec<&str> = lower.split('_').collect();
    REPLACEMENT_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| has_token_run(&tokens, k)))
        .map(|(_, reason)| *reason)
}

fn has_token_run(tokens: &[&str], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split('_').collect();
    tokens.windows(parts.len()).any(|window| window == parts.as_slice())
}

fn property_reason(context: &DangerContext<'_>) -> Option<String> {
    match context.matched_properties {
        [] => None,
        [property] => Some(single_property_reason(property)),
        _ => Some(String::from("Multiple sensitive properties changed")),
    }
}

fn single_property_reason(property: &str) -> String {
    let lower = property.to_lowercase();
    let reason = if lower.contains("password") || lower.contains("secret") {
        "Credential change"
    } else if lower.contains("key") || lower.contains("token") {
        "Authentication key change"
    } else if lower == "user_data" {
        "User data modification"
    } else if lower.contains("security") || lower.contains("policy") {
        "Security configuration change"
    } else {
        return format!("Sensitive property change: {property}");
    };
    reason.to_string()
}
