//! Configuration Loader
//!
//! Builds a [`DispatcherConfig`] from a dictionary, a YAML document or a YAML
//! file, applies `TASKFLOW_*` environment overrides and validates the result.
//! Keys missing from the source keep their defaults.

use super::error::{ConfigResult, ConfigurationError};
use super::DispatcherConfig;
use crate::cache::{CacheScope, PolicyKind};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Environment variable pointing at the configuration file
pub const CONFIG_PATH_ENV: &str = "TASKFLOW_CONFIG_PATH";

impl DispatcherConfig {
    /// Build configuration from an already parsed dictionary
    pub fn from_dict(dict: &serde_json::Value) -> ConfigResult<Self> {
        if !dict.is_object() {
            return Err(ConfigurationError::invalid_structure(
                "dispatcher configuration",
                "expected a mapping at the top level",
            ));
        }

        serde_json::from_value(dict.clone())
            .map_err(|e| ConfigurationError::invalid_structure("dispatcher configuration", e))
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: serde_json::Value = serde_yaml::from_str(yaml)
            .map_err(|e| ConfigurationError::invalid_yaml("<inline>", e))?;

        // A document holding only comments means "all defaults"
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::from_dict(&value)
    }

    /// Read and parse a YAML configuration file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = read_config_file_safely(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: serde_json::Value = serde_yaml::from_str(&content)
            .map_err(|e| ConfigurationError::invalid_yaml(path.display().to_string(), e))?;

        if value.is_null() {
            return Ok(Self::default());
        }
        Self::from_dict(&value)
    }

    /// Apply `TASKFLOW_*` environment variable overrides
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (used by tests instead of the process env)
    pub fn with_overrides_from<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(module) = lookup("TASKFLOW_PREDICATES_MODULE") {
            debug!(predicates_module = %module, "Predicates module override");
            self.predicates_module = module;
        }

        if let Some(name) = lookup("TASKFLOW_STRATEGY") {
            debug!(strategy = %name, "Dispatcher strategy override");
            self.strategy.name = name;
        }

        if let Some(policy) = lookup("TASKFLOW_CACHE_POLICY") {
            self.cache.policy = policy.parse::<PolicyKind>()?;
            debug!(policy = %self.cache.policy, "Cache policy override");
        }

        if let Some(size) = lookup("TASKFLOW_CACHE_MAX_SIZE") {
            self.cache.max_cache_size = size.parse().map_err(|e| {
                ConfigurationError::environment_override_error("TASKFLOW_CACHE_MAX_SIZE", e)
            })?;
            debug!(max_cache_size = self.cache.max_cache_size, "Cache size override");
        }

        if let Some(scope) = lookup("TASKFLOW_CACHE_SCOPE") {
            self.cache.scope = scope.parse::<CacheScope>().map_err(|e| {
                ConfigurationError::environment_override_error("TASKFLOW_CACHE_SCOPE", e)
            })?;
            debug!(scope = %self.cache.scope, "Cache scope override");
        }

        if let Some(enabled) = lookup("TASKFLOW_TRACE_ENABLED") {
            self.trace.enabled = enabled.parse().map_err(|e| {
                ConfigurationError::environment_override_error("TASKFLOW_TRACE_ENABLED", e)
            })?;
        }

        Ok(self)
    }
}

/// Read a configuration file with a size limit
fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;

    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigurationError::file_read_error(
            path.display().to_string(),
            format!(
                "file is {} bytes, limit is {MAX_CONFIG_FILE_SIZE} bytes",
                metadata.len()
            ),
        ));
    }

    std::fs::read_to_string(path)
        .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))
}

/// Detect the deployment environment from common environment variables
pub fn detect_environment() -> String {
    env::var("TASKFLOW_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Loaded, validated configuration shared by the dispatcher components
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<DispatcherConfig>,
    environment: String,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `TASKFLOW_CONFIG_PATH` or defaults, then environment overrides
    pub fn load() -> ConfigResult<Self> {
        let path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from(path)
    }

    /// Load configuration from an optional file path
    pub fn load_from(path: Option<PathBuf>) -> ConfigResult<Self> {
        let environment = detect_environment();

        let config = match &path {
            Some(path) => {
                debug!(
                    path = %path.display(),
                    environment = %environment,
                    "Loading dispatcher configuration file"
                );
                DispatcherConfig::from_file(path)?
            }
            None => {
                debug!(environment = %environment, "No configuration file, using defaults");
                DispatcherConfig::default()
            }
        };

        let config = config.with_env_overrides()?;
        Self::from_config(config, environment, path)
    }

    /// Wrap an already built configuration after validating it
    pub fn from_config(
        config: DispatcherConfig,
        environment: impl Into<String>,
        source: Option<PathBuf>,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let environment = environment.into();
        info!(
            environment = %environment,
            source = ?source,
            "Dispatcher configuration loaded successfully"
        );
        config.log_configuration();

        Ok(Self {
            config: Arc::new(config),
            environment,
            source,
        })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Shared handle passed to dispatcher constructors
    pub fn shared(&self) -> Arc<DispatcherConfig> {
        Arc::clone(&self.config)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// File the configuration was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
