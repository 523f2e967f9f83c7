//! Configuration validation for analysis settings.
//!
//! Empty names are hard errors because they can never match a resource.
//! Duplicates and disabled limits are reported as warnings only.

use crate::error::{ConfigError, PlanLensError, Result};
use std::collections::HashSet;
use tracing::debug;

use super::spec::{AnalysisConfig, PerformanceLimits};

/// Validator for analysis configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates an analysis configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any were found.
    pub fn validate(&self, config: &AnalysisConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_sensitive_resources(config, &mut result);
        Self::validate_sensitive_properties(config, &mut result);
        Self::validate_limits(&config.limits, &mut result);

        if config.grouping.threshold == 0 {
            result.warnings.push(format!(
                "grouping.threshold is 0, the default of {} applies",
                config.grouping.effective_threshold()
            ));
        }

        match result.errors.first() {
            None => {
                debug!(warnings = result.warnings.len(), "Configuration validation passed");
                Ok(result)
            }
            Some(first_error) => Err(PlanLensError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            ))),
        }
    }

    fn validate_sensitive_resources(config: &AnalysisConfig, result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for (i, resource) in config.sensitive_resources.iter().enumerate() {
            let field = format!("sensitive_resources[{i}].resource_type");
            if resource.resource_type.trim().is_empty() {
                result.errors.push(ValidationError {
                    field,
                    message: String::from("Sensitive resource type cannot be empty"),
                });
            } else if !seen.insert(resource.resource_type.as_str()) {
                result.warnings.push(format!(
                    "Duplicate sensitive resource type: {}",
                    resource.resource_type
                ));
            }
        }
    }

    fn validate_sensitive_properties(config: &AnalysisConfig, result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for (i, entry) in config.sensitive_properties.iter().enumerate() {
            let prefix = format!("sensitive_properties[{i}]");
            if entry.resource_type.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.resource_type"),
                    message: String::from("Sensitive property resource type cannot be empty"),
                });
                continue;
            }
            if entry.property.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.property"),
                    message: format!(
                        "Sensitive property name for '{}' cannot be empty",
                        entry.resource_type
                    ),
                });
                continue;
            }
            if !seen.insert((entry.resource_type.as_str(), entry.property.as_str())) {
                result.warnings.push(format!(
                    "Duplicate sensitive property: {}.{}",
                    entry.resource_type, entry.property
                ));
            }
        }
    }

    fn validate_limits(limits: &PerformanceLimits, result: &mut ValidationResult) {
        let bounds = [
            ("limits.max_properties_per_resource", limits.max_properties_per_resource),
            ("limits.max_property_size", limits.max_property_size),
            ("limits.max_total_memory", limits.max_total_memory),
            ("limits.max_dependency_depth", limits.max_dependency_depth),
        ];

        for (field, value) in bounds {
            if value == 0 {
                result.warnings.push(format!("{field} is 0, the bound is disabled"));
            }
        }

        if limits.max_total_memory != 0
            && limits.max_property_size != 0
            && limits.max_property_size > limits.max_total_memory
        {
            result.warnings.push(String::from(
                "limits.max_property_size exceeds limits.max_total_memory",
            ));
        }
    }
}

impl ValidationResult {
    /// Returns true if there are no errors.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let result = ConfigValidator::new()
            .validate(&AnalysisConfig::default())
            .expect("default config should validate");
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_resource_type_is_error() {
        let config = AnalysisConfig::default().with_sensitive_resource("  ");
        let result = ConfigValidator::new().validate(&config);
        assert!(matches!(
            result,
            Err(PlanLensError::Config(ConfigError::ValidationError { field: Some(ref f), .. }))
                if f == "sensitive_resources[0].resource_type"
        ));
    }

    #[test]
    fn test_empty_property_is_error() {
        let config = AnalysisConfig::default().with_sensitive_property("aws_instance", "");
        assert!(ConfigValidator::new().validate(&config).is_err());
    }

    #[test]
    fn test_duplicates_are_warnings() {
        let config = AnalysisConfig::default()
            .with_sensitive_resource("aws_db_instance")
            .with_sensitive_resource("aws_db_instance")
            .with_sensitive_property("aws_instance", "user_data")
            .with_sensitive_property("aws_instance", "user_data");

        let result = ConfigValidator::new()
            .validate(&config)
            .expect("duplicates should not fail validation");
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_zero_limits_are_warnings() {
        let config = AnalysisConfig::default()
            .with_limits(PerformanceLimits {
                max_properties_per_resource: 0,
                ..PerformanceLimits::default()
            })
            .with_grouping(true, 0);

        let result = ConfigValidator::new()
            .validate(&config)
            .expect("zero limits should not fail validation");
        assert_eq!(result.warnings.len(), 2);
    }
}
