//! Error types for the plan summarizer.
//!
//! The analysis engine itself never fails: malformed-but-parseable input
//! degrades to "no change detected". Errors only arise at the edges, when a
//! configuration file or a plan document cannot be read or decoded.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the plan summarizer.
#[derive(Debug, Error)]
pub enum PlanLensError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan loading errors.
    #[error("Plan error: {0}")]
    Load(#[from] LoadError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// An environment override held a value of the wrong shape.
    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnvVar {
        /// Name of the variable.
        name: String,
        /// The rejected value.
        value: String,
    },
}

/// Errors raised while loading a plan document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The plan file was not found.
    #[error("Plan file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The plan file could not be read.
    #[error("Failed to read plan {path}: {source}")]
    ReadFailed {
        /// Path to the plan file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The plan document is not valid JSON for the expected shape.
    #[error("Failed to parse plan: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },
}

/// Result type alias for plan summarizer operations.
pub type Result<T> = std::result::Result<T, PlanLensError>;

impl PlanLensError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl LoadError {
    /// Creates a parse error with an optional source location.
    #[must_use]
    pub fn parse(message: impl Into<String>, location: Option<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_wraps_into_top_level() {
        let err: PlanLensError = ConfigError::validation("bad threshold", "grouping.threshold").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Configuration validation failed: bad threshold"
        );
    }

    #[test]
    fn test_load_error_message() {
        let err = LoadError::parse("expected value at line 1", Some(String::from("plan.json")));
        assert_eq!(err.to_string(), "Failed to parse plan: expected value at line 1");
    }
}
