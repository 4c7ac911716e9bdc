//! # Dispatcher Configuration System
//!
//! Explicit configuration for the dispatcher core. A [`DispatcherConfig`] is
//! built once at startup (from a dictionary, a YAML document or a file, plus
//! environment overrides), validated, and then shared as an
//! `Arc<DispatcherConfig>` with the dispatcher and cache constructors.
//!
//! ## Usage
//!
//! ```rust
//! use taskflow_core::config::DispatcherConfig;
//! use serde_json::json;
//!
//! let config = DispatcherConfig::from_dict(&json!({
//!     "predicates_module": "myapp.predicates",
//!     "strategy": {"name": "linear_adopt", "args": {"start_retry": 1, "max_retry": 30, "step": 2}}
//! }))
//! .unwrap();
//!
//! assert_eq!(config.predicates_module, "myapp.predicates");
//! assert_eq!(config.cache.max_cache_size, 1000);
//! ```

pub mod error;
pub mod loader;

use crate::cache::{CacheScope, PolicyKind};
use crate::strategy::StrategyRegistry;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

const DEFAULT_PREDICATES_MODULE: &str = "taskflow.predicates";

fn default_predicates_module() -> String {
    DEFAULT_PREDICATES_MODULE.to_string()
}

/// Root dispatcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Fully-qualified name of the module providing flow condition predicates
    #[serde(default = "default_predicates_module")]
    pub predicates_module: String,

    /// Tracing hook settings
    #[serde(default)]
    pub trace: TraceConfig,

    /// Retry scheduling strategy
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Result cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            predicates_module: default_predicates_module(),
            trace: TraceConfig::default(),
            strategy: StrategyConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Tracing hook configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Forward dispatcher trace events to the `tracing` subscriber
    #[serde(default)]
    pub enabled: bool,
}

/// Retry strategy selection and its arguments
///
/// Argument values are seconds and may be fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Registered strategy name, e.g. `biexponential_increase`
    #[serde(default = "default_strategy_name")]
    pub name: String,
    #[serde(default)]
    pub args: StrategyArgs,
}

fn default_strategy_name() -> String {
    "biexponential_increase".to_string()
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: default_strategy_name(),
            args: StrategyArgs::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyArgs {
    #[serde(default = "default_start_retry")]
    pub start_retry: f64,
    #[serde(default = "default_max_retry")]
    pub max_retry: f64,
    /// Only used by the linear strategies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

fn default_start_retry() -> f64 {
    2.0
}

fn default_max_retry() -> f64 {
    120.0
}

impl Default for StrategyArgs {
    fn default() -> Self {
        Self {
            start_retry: default_start_retry(),
            max_retry: default_max_retry(),
            step: None,
        }
    }
}

impl StrategyArgs {
    /// Convert a seconds value to a `Duration`, rejecting negative or non-finite input
    pub(crate) fn seconds(field: &str, value: f64) -> ConfigResult<Duration> {
        Duration::try_from_secs_f64(value).map_err(|e| {
            ConfigurationError::invalid_value(
                format!("strategy.args.{field}"),
                value.to_string(),
                e.to_string(),
            )
        })
    }
}

/// Result cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_policy")]
    pub policy: PolicyKind,
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: usize,
    #[serde(default)]
    pub scope: CacheScope,
}

fn default_true() -> bool {
    true
}

fn default_policy() -> PolicyKind {
    PolicyKind::Lru
}

fn default_max_cache_size() -> usize {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: default_policy(),
            max_cache_size: default_max_cache_size(),
            scope: CacheScope::default(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_cache_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.max_cache_size",
                "0",
                "cache capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

impl DispatcherConfig {
    /// Small-cache, fast-retry preset for tests
    pub fn for_test() -> Self {
        Self {
            predicates_module: default_predicates_module(),
            trace: TraceConfig { enabled: true },
            strategy: StrategyConfig {
                name: "linear_increase".to_string(),
                args: StrategyArgs {
                    start_retry: 0.01,
                    max_retry: 0.05,
                    step: Some(0.01),
                },
            },
            cache: CacheConfig {
                max_cache_size: 16,
                ..CacheConfig::default()
            },
        }
    }

    /// Validate every section, resolving the strategy against the built-in registry
    pub fn validate(&self) -> ConfigResult<()> {
        if self.predicates_module.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "predicates_module",
                "dispatcher configuration",
            ));
        }

        StrategyRegistry::with_builtins().resolve(&self.strategy)?;
        self.cache.validate()
    }

    /// Log current configuration for debugging
    pub fn log_configuration(&self) {
        info!(
            predicates_module = %self.predicates_module,
            trace_enabled = self.trace.enabled,
            strategy = %self.strategy.name,
            start_retry = self.strategy.args.start_retry,
            max_retry = self.strategy.args.max_retry,
            step = ?self.strategy.args.step,
            cache_enabled = self.cache.enabled,
            cache_policy = %self.cache.policy,
            max_cache_size = self.cache.max_cache_size,
            cache_scope = %self.cache.scope,
            "Dispatcher configuration"
        );
    }
}
