//! Cache instances owned by the dispatcher
//!
//! Whether each `(flow, task)` pair gets its own [`ResultCache`] or every task
//! shares one namespace is a deployment decision expressed by [`CacheScope`].
//! Lookups are always keyed by the full [`ResultKey`], so the two scopes only
//! differ in how capacity is partitioned.

use super::errors::{CacheError, CacheResult};
use super::result_cache::{CacheStats, ResultCache};
use crate::config::{CacheConfig, ConfigurationError};
use crate::logging::log_cache_operation;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// How result caches are partitioned between flows and tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum CacheScope {
    /// One cache instance per `(flow, task)` pair, each with the full capacity
    #[default]
    PerTask,
    /// A single cache instance shared by every flow and task
    Shared,
}

impl CacheScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerTask => "per_task",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for CacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheScope {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_task" => Ok(Self::PerTask),
            "shared" => Ok(Self::Shared),
            other => Err(ConfigurationError::invalid_value(
                "cache.scope",
                other,
                "expected one of: per_task, shared",
            )),
        }
    }
}

impl TryFrom<String> for CacheScope {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Identity of a cached task result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultKey {
    pub flow_name: String,
    pub task_name: String,
    pub task_id: String,
}

impl ResultKey {
    pub fn new(
        flow_name: impl Into<String>,
        task_name: impl Into<String>,
        task_id: impl Into<String>,
    ) -> Self {
        Self {
            flow_name: flow_name.into(),
            task_name: task_name.into(),
            task_id: task_id.into(),
        }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.flow_name, self.task_name, self.task_id)
    }
}

/// Namespace a cache instance is registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    Shared,
    Task { flow_name: String, task_name: String },
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => f.write_str("shared"),
            Self::Task {
                flow_name,
                task_name,
            } => write!(f, "{flow_name}/{task_name}"),
        }
    }
}

/// Registry of result caches following the configured [`CacheScope`]
///
/// When caching is disabled every lookup misses and every store is dropped.
pub struct CacheRegistry<V = serde_json::Value> {
    config: CacheConfig,
    capacity: NonZeroUsize,
    caches: DashMap<CacheNamespace, Arc<ResultCache<ResultKey, V>>>,
}

impl<V> fmt::Debug for CacheRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("config", &self.config)
            .field("instances", &self.caches.len())
            .finish()
    }
}

impl<V: Clone> CacheRegistry<V> {
    /// Create a registry from validated cache configuration
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.max_cache_size).ok_or_else(|| {
            ConfigurationError::invalid_value(
                "cache.max_cache_size",
                "0",
                "cache capacity must be at least 1",
            )
        })?;

        info!(
            enabled = config.enabled,
            policy = %config.policy,
            max_cache_size = config.max_cache_size,
            scope = ?config.scope,
            "Result cache registry initialized"
        );

        Ok(Self {
            config: config.clone(),
            capacity,
            caches: DashMap::new(),
        })
    }

    /// Registry that never caches anything
    pub fn disabled() -> Self {
        Self {
            config: CacheConfig {
                enabled: false,
                ..CacheConfig::default()
            },
            capacity: NonZeroUsize::MIN,
            caches: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn scope(&self) -> CacheScope {
        self.config.scope
    }

    fn namespace(&self, key: &ResultKey) -> CacheNamespace {
        match self.config.scope {
            CacheScope::Shared => CacheNamespace::Shared,
            CacheScope::PerTask => CacheNamespace::Task {
                flow_name: key.flow_name.clone(),
                task_name: key.task_name.clone(),
            },
        }
    }

    /// Cache instance serving `key`, created on first use
    pub fn cache_for(&self, key: &ResultKey) -> Arc<ResultCache<ResultKey, V>> {
        let namespace = self.namespace(key);
        let label = namespace.to_string();
        self.caches
            .entry(namespace)
            .or_insert_with(|| {
                debug!(namespace = %label, "Creating result cache instance");
                Arc::new(ResultCache::with_capacity(self.config.policy, self.capacity))
            })
            .clone()
    }

    /// Look up a cached result
    pub fn get(&self, key: &ResultKey) -> CacheResult<V> {
        if !self.config.enabled {
            return Err(CacheError::Miss);
        }

        let result = self.cache_for(key).get(key);
        log_cache_operation("get", &key.to_string(), self.config.policy.as_str(), Some(result.is_ok()));
        result
    }

    /// Store a freshly obtained result
    pub fn add(&self, key: ResultKey, value: V) {
        if !self.config.enabled {
            return;
        }
        log_cache_operation("add", &key.to_string(), self.config.policy.as_str(), None);
        self.cache_for(&key).add(key, value);
    }

    /// Statistics per registered namespace
    pub fn stats(&self) -> Vec<(CacheNamespace, CacheStats)> {
        self.caches
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().stats()))
            .collect()
    }

    pub fn instance_count(&self) -> usize {
        self.caches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PolicyKind;

    fn config(scope: CacheScope, max_cache_size: usize) -> CacheConfig {
        CacheConfig {
            enabled: true,
            policy: PolicyKind::Lru,
            max_cache_size,
            scope,
        }
    }

    #[test]
    fn test_cache_for_creates_each_namespace_once() {
        let registry: CacheRegistry<i32> =
            CacheRegistry::from_config(&config(CacheScope::PerTask, 4)).unwrap();
        let key = ResultKey::new("flow1", "Task1", "id1");

        let first = registry.cache_for(&key);
        let second = registry.cache_for(&ResultKey::new("flow1", "Task1", "id2"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.instance_count(), 1);

        registry.cache_for(&ResultKey::new("flow2", "Task1", "id1"));
        assert_eq!(registry.instance_count(), 2);
    }

    #[test]
    fn test_scope_names() {
        assert_eq!("per_task".parse::<CacheScope>().unwrap(), CacheScope::PerTask);
        assert_eq!(" Shared ".parse::<CacheScope>().unwrap(), CacheScope::Shared);
        assert_eq!("per-task".parse::<CacheScope>().unwrap(), CacheScope::PerTask);
        assert!("global".parse::<CacheScope>().is_err());
        assert_eq!(CacheScope::PerTask.to_string(), "per_task");
    }

    #[test]
    fn test_per_task_scope_partitions_capacity() {
        let registry: CacheRegistry<i32> =
            CacheRegistry::from_config(&config(CacheScope::PerTask, 1)).unwrap();

        registry.add(ResultKey::new("flow1", "Task1", "id1"), 1);
        registry.add(ResultKey::new("flow1", "Task2", "id1"), 2);

        assert_eq!(registry.instance_count(), 2);
        assert_eq!(registry.get(&ResultKey::new("flow1", "Task1", "id1")), Ok(1));
        assert_eq!(registry.get(&ResultKey::new("flow1", "Task2", "id1")), Ok(2));
    }

    #[test]
    fn test_shared_scope_uses_tuple_keys() {
        let registry: CacheRegistry<i32> =
            CacheRegistry::from_config(&config(CacheScope::Shared, 1)).unwrap();

        registry.add(ResultKey::new("flow1", "Task1", "id1"), 1);
        registry.add(ResultKey::new("flow1", "Task2", "id1"), 2);

        assert_eq!(registry.instance_count(), 1);
        assert_eq!(
            registry.get(&ResultKey::new("flow1", "Task1", "id1")),
            Err(CacheError::Miss)
        );
        assert_eq!(registry.get(&ResultKey::new("flow1", "Task2", "id1")), Ok(2));
    }

    #[test]
    fn test_disabled_registry_always_misses() {
        let registry: CacheRegistry<i32> = CacheRegistry::disabled();
        let key = ResultKey::new("flow1", "Task1", "id1");
        registry.add(key.clone(), 1);

        assert!(!registry.is_enabled());
        assert_eq!(registry.get(&key), Err(CacheError::Miss));
        assert_eq!(registry.instance_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = CacheRegistry::<i32>::from_config(&config(CacheScope::Shared, 0));
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_per_namespace() {
        let registry: CacheRegistry<i32> =
            CacheRegistry::from_config(&config(CacheScope::PerTask, 4)).unwrap();
        let key = ResultKey::new("flow1", "Task1", "id1");
        registry.add(key.clone(), 1);
        registry.get(&key).unwrap();

        let stats = registry.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].0.to_string(), "flow1/Task1");
        assert_eq!(stats[0].1.hits, 1);
    }
}
