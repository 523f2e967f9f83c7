//! Plan document loading.
//!
//! Reads a plan that has already been rendered to JSON. Producing that
//! document is left to the caller.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{LoadError, PlanLensError, Result};

use super::types::Plan;

/// Plan format major version this crate understands.
pub const SUPPORTED_FORMAT_MAJOR: &str = "1";

/// Loader for plan documents.
#[derive(Debug, Default)]
pub struct PlanLoader;

impl PlanLoader {
    /// Creates a new plan loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a plan from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not a plan document.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Plan> {
        let path = path.as_ref();
        info!("Loading plan from: {}", path.display());

        if !path.exists() {
            return Err(PlanLensError::Load(LoadError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|source| {
            PlanLensError::Load(LoadError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })
        })?;

        self.parse_json(&content, Some(path))
    }

    /// Parses a plan from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a JSON plan document.
    pub fn parse_json(&self, content: &str, source: Option<&Path>) -> Result<Plan> {
        debug!("Parsing plan JSON");

        let plan: Plan = serde_json::from_str(content).map_err(|e| {
            PlanLensError::Load(LoadError::parse(
                format!("JSON parse error: {e}"),
                source.map(|p| p.display().to_string()),
            ))
        })?;

        if !plan.format_version.is_empty()
            && plan.format_version.split('.').next() != Some(SUPPORTED_FORMAT_MAJOR)
        {
            warn!(
                format_version = %plan.format_version,
                "Plan format version is not 1.x, output may be incomplete"
            );
        }

        debug!(
            resources = plan.resource_changes.len(),
            outputs = plan.output_changes.len(),
            "Successfully parsed plan"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Action, PathSegment};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "format_version": "1.2",
        "terraform_version": "1.7.5",
        "resource_changes": [
            {
                "address": "aws_instance.web",
                "type": "aws_instance",
                "name": "web",
                "provider_name": "registry.terraform.io/hashicorp/aws",
                "change": {
                    "actions": ["delete", "create"],
                    "before": {"ami": "ami-1"},
                    "after": {"ami": "ami-2"},
                    "after_unknown": {"id": true},
                    "before_sensitive": {},
                    "after_sensitive": {},
                    "replace_paths": [["ami"]]
                }
            }
        ],
        "output_changes": {
            "ip": {"actions": ["update"], "before": "1.1.1.1", "after": null, "after_unknown": true}
        }
    }"#;

    #[test]
    fn test_parse_sample_plan() {
        let plan = PlanLoader::new().parse_json(SAMPLE, None).expect("plan should parse");

        assert_eq!(plan.terraform_version, "1.7.5");
        assert_eq!(plan.resource_changes.len(), 1);
        let resource = &plan.resource_changes[0];
        assert_eq!(resource.resource_type, "aws_instance");
        assert_eq!(resource.change.actions, vec![Action::Delete, Action::Create]);
        assert_eq!(resource.change.replace_paths, vec![vec![PathSegment::from("ami")]]);
        assert!(plan.output_changes.contains_key("ip"));
    }

    #[test]
    fn test_empty_object_is_empty_plan() {
        let plan = PlanLoader::new().parse_json("{}", None).expect("plan should parse");
        assert!(plan.resource_changes.is_empty());
        assert!(plan.output_changes.is_empty());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = PlanLoader::new().parse_json("not json", None);
        assert!(matches!(
            result,
            Err(PlanLensError::Load(LoadError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_load_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("plan.json");
        std::fs::write(&path, SAMPLE).expect("Failed to write plan");

        let plan = PlanLoader::new().load_file(&path).expect("plan should load");
        assert_eq!(plan.resource_changes[0].address, "aws_instance.web");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let result = PlanLoader::new().load_file(temp.path().join("missing.json"));
        assert!(matches!(
            result,
            Err(PlanLensError::Load(LoadError::FileNotFound { .. }))
        ));
    }
}
