//! Configuration module for the plan summarizer.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `planlens.yaml`
//! - Environment variable overrides
//! - Validation of configuration values

mod spec;
mod parser;
mod validator;

pub use spec::{
    AnalysisConfig, GroupingConfig, PerformanceLimits, SensitiveProperty, SensitiveResource,
    DEFAULT_GROUPING_THRESHOLD, DEFAULT_MAX_DEPENDENCY_DEPTH, DEFAULT_MAX_PROPERTIES_PER_RESOURCE,
    DEFAULT_MAX_PROPERTY_SIZE, DEFAULT_MAX_TOTAL_MEMORY,
};
pub use parser::{
    ConfigParser, DEFAULT_CONFIG_FILES, ENV_GROUPING_ENABLED, ENV_GROUPING_THRESHOLD,
    ENV_MAX_PROPERTIES, find_config_file,
};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
