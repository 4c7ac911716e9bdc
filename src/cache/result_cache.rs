//! Bounded result cache
//!
//! A [`ResultCache`] stores previously computed task results so the
//! dispatcher can skip redundant executions. Capacity is fixed at
//! construction; when a new key arrives at capacity exactly one entry is
//! evicted first, chosen by the configured [`PolicyKind`].
//!
//! One mutex guards the whole instance, so capacity checks and eviction are
//! atomic with respect to concurrent `add`/`get` calls.

use super::errors::{CacheError, CacheResult};
use super::ordering::RecencyList;
use super::policy::{PolicyBackend, PolicyKind};
use crate::config::ConfigurationError;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Snapshot of a cached entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,
    /// Sequence number of the last rank refresh (higher is newer)
    pub recency_rank: u64,
}

/// Counters maintained by every cache instance
#[derive(Debug, Default)]
struct StatsCounter {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
}

impl StatsCounter {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, `0.0` before any lookup
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

struct CacheInner<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Option<(K, V)>>,
    free: Vec<usize>,
    order: RecencyList,
    policy: PolicyBackend,
}

impl<K, V> CacheInner<K, V>
where
    K: Hash + Eq + Clone,
{
    fn alloc(&mut self, key: K, value: V) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some((key, value));
                slot
            }
            None => {
                self.slots.push(Some((key, value)));
                self.slots.len() - 1
            }
        }
    }

    /// Remove the policy's victim; returns `false` when nothing could be evicted
    fn evict_one(&mut self) -> bool {
        let Some(victim) = self.policy.choose_victim(&self.order) else {
            return false;
        };

        self.order.remove(victim);
        if let Some((key, _)) = self.slots[victim].take() {
            self.index.remove(&key);
        }
        self.free.push(victim);
        true
    }
}

/// Bounded associative store with a pluggable eviction policy
pub struct ResultCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
    max_cache_size: usize,
    kind: PolicyKind,
    stats: StatsCounter,
}

impl<K, V> fmt::Debug for ResultCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("policy", &self.kind)
            .field("max_cache_size", &self.max_cache_size)
            .field("len", &self.inner.lock().index.len())
            .finish()
    }
}

impl<K, V> ResultCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `max_cache_size` entries
    ///
    /// A zero capacity is rejected so misconfiguration fails at startup.
    pub fn new(policy: PolicyKind, max_cache_size: usize) -> Result<Self, ConfigurationError> {
        Self::build(policy, max_cache_size, None)
    }

    /// Same as [`ResultCache::new`] with a fixed seed for random replacement
    pub fn with_seed(
        policy: PolicyKind,
        max_cache_size: usize,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        Self::build(policy, max_cache_size, Some(seed))
    }

    /// Create a cache from an already validated capacity
    pub fn with_capacity(policy: PolicyKind, capacity: NonZeroUsize) -> Self {
        Self::from_parts(policy, capacity, None)
    }

    fn build(
        policy: PolicyKind,
        max_cache_size: usize,
        seed: Option<u64>,
    ) -> Result<Self, ConfigurationError> {
        let capacity = NonZeroUsize::new(max_cache_size).ok_or_else(|| {
            ConfigurationError::invalid_value(
                "cache.max_cache_size",
                "0",
                "cache capacity must be at least 1",
            )
        })?;
        Ok(Self::from_parts(policy, capacity, seed))
    }

    fn from_parts(policy: PolicyKind, capacity: NonZeroUsize, seed: Option<u64>) -> Self {
        let max_cache_size = capacity.get();
        debug!(
            policy = %policy,
            max_cache_size = max_cache_size,
            "Result cache created"
        );

        Self {
            inner: Mutex::new(CacheInner {
                index: HashMap::with_capacity(max_cache_size.min(1024)),
                slots: Vec::new(),
                free: Vec::new(),
                order: RecencyList::new(),
                policy: PolicyBackend::new(policy, seed),
            }),
            max_cache_size,
            kind: policy,
            stats: StatsCounter::default(),
        }
    }

    /// Store `value` under `key`
    ///
    /// Overwriting an existing key never evicts. A new key at capacity evicts
    /// exactly one entry before it is stored.
    pub fn add(&self, key: K, value: V) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(&slot) = inner.index.get(&key) {
            if let Some(entry) = inner.slots[slot].as_mut() {
                entry.1 = value;
            }
            inner.policy.on_overwrite(&mut inner.order, slot);
            return;
        }

        if inner.index.len() >= self.max_cache_size && inner.evict_one() {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(
                policy = inner.policy.policy_name(),
                max_cache_size = self.max_cache_size,
                "Cache EVICT"
            );
        }

        let slot = inner.alloc(key.clone(), value);
        inner.index.insert(key, slot);
        inner.policy.on_insert(&mut inner.order, slot);
        self.stats.insertions.fetch_add(1, Ordering::Relaxed);
    }

    /// Look up `key`, recording a use for access-ordered policies
    pub fn get(&self, key: &K) -> CacheResult<V> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let Some(&slot) = inner.index.get(key) else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return Err(CacheError::Miss);
        };

        inner.policy.on_access(&mut inner.order, slot);
        self.stats.hits.fetch_add(1, Ordering::Relaxed);

        inner.slots[slot]
            .as_ref()
            .map(|(_, value)| value.clone())
            .ok_or(CacheError::Miss)
    }

    /// Check for `key` without touching the eviction order or statistics
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries (`max_cache_size`)
    pub fn capacity(&self) -> usize {
        self.max_cache_size
    }

    pub fn policy(&self) -> PolicyKind {
        self.kind
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Drop every entry; statistics are kept
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.index.clear();
        inner.slots.clear();
        inner.free.clear();
        inner.order.clear();
    }

    /// Entries ordered from newest rank to oldest rank
    pub fn entries(&self) -> Vec<CacheEntry<K, V>> {
        let inner = self.inner.lock();
        inner
            .order
            .iter_newest_first()
            .filter_map(|slot| {
                let (key, value) = inner.slots[slot].as_ref()?;
                Some(CacheEntry {
                    key: key.clone(),
                    value: value.clone(),
                    recency_rank: inner.order.rank(slot)?,
                })
            })
            .collect()
    }
}
