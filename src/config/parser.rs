//! Configuration parser for loading analysis settings.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{ConfigError, PlanLensError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::AnalysisConfig;

/// Environment variable overriding `grouping.enabled`.
pub const ENV_GROUPING_ENABLED: &str = "PLANLENS_GROUPING_ENABLED";
/// Environment variable overriding `grouping.threshold`.
pub const ENV_GROUPING_THRESHOLD: &str = "PLANLENS_GROUPING_THRESHOLD";
/// Environment variable overriding `limits.max_properties_per_resource`.
pub const ENV_MAX_PROPERTIES: &str = "PLANLENS_MAX_PROPERTIES";

/// Configuration parser for loading analysis configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<AnalysisConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(PlanLensError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PlanLensError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string. Blank input yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<AnalysisConfig> {
        debug!("Parsing YAML configuration");

        if content.trim().is_empty() {
            debug!("Configuration is empty, using defaults");
            return Ok(AnalysisConfig::default());
        }

        let config: AnalysisConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            PlanLensError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            sensitive_resources = config.sensitive_resources.len(),
            sensitive_properties = config.sensitive_properties.len(),
            "Successfully parsed configuration"
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// override holds a malformed value.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<AnalysisConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_overrides(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies overrides looked up through `lookup`, keyed by variable name.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be parsed.
    pub fn apply_overrides<F>(config: &mut AnalysisConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_GROUPING_ENABLED) {
            debug!("Overriding grouping.enabled from environment");
            config.grouping.enabled = parse_bool(ENV_GROUPING_ENABLED, &value)?;
        }

        if let Some(value) = lookup(ENV_GROUPING_THRESHOLD) {
            debug!("Overriding grouping.threshold from environment");
            config.grouping.threshold = parse_usize(ENV_GROUPING_THRESHOLD, &value)?;
        }

        if let Some(value) = lookup(ENV_MAX_PROPERTIES) {
            debug!("Overriding limits.max_properties_per_resource from environment");
            config.limits.max_properties_per_resource = parse_usize(ENV_MAX_PROPERTIES, &value)?;
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                PlanLensError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_env(name, value)),
    }
}

fn parse_usize(name: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| invalid_env(name, value))
}

fn invalid_env(name: &str, value: &str) -> PlanLensError {
    PlanLensError::Config(ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "planlens.yaml",
    "planlens.yml",
    ".planlens.yaml",
    ".planlens.yml",
];

/// Finds the configuration file in the start directory, its parents, or the
/// user configuration directory (`<config_dir>/planlens/config.yaml`).
///
/// Returns `None` when no file exists; callers fall back to defaults.
#[must_use]
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("planlens").join("config.yaml");
    if user_config.exists() {
        info!("Found user configuration file: {}", user_config.display());
        return Some(user_config);
    }

    debug!("No configuration file found, using defaults");
    None
}
