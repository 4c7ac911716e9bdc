//! Eviction policy trait and enum dispatch
//!
//! Uses enum dispatch for the five built-in policies: every policy shares the
//! [`RecencyList`] storage shape and only differs in which events refresh a
//! slot's rank and which end of the order is sacrificed.

use super::ordering::RecencyList;
use super::policies::{
    FifoPolicy, LifoPolicy, LruPolicy, MruPolicy, RandomReplacementPolicy,
};
use crate::config::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordering capability implemented by each eviction policy
///
/// All methods run under the owning cache's lock.
pub trait EvictionPolicy: Send + fmt::Debug {
    /// Called after a new key was stored in `slot`.
    fn on_insert(&mut self, order: &mut RecencyList, slot: usize) {
        order.push_newest(slot);
    }

    /// Called on a successful lookup of `slot`.
    fn on_access(&mut self, order: &mut RecencyList, slot: usize);

    /// Called when an existing key in `slot` receives a new value.
    fn on_overwrite(&mut self, order: &mut RecencyList, slot: usize);

    /// Pick the slot to evict when the cache is full.
    fn choose_victim(&mut self, order: &RecencyList) -> Option<usize>;

    /// Name of the policy
    fn policy_name(&self) -> &'static str;
}

/// Built-in eviction policies selectable from configuration
///
/// Names are matched case-insensitively wherever they come from, and `random`
/// is accepted as an alias of `rr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PolicyKind {
    /// First in, first out
    Fifo,
    /// Last in, first out
    Lifo,
    /// Least recently used
    Lru,
    /// Most recently used
    Mru,
    /// Random replacement
    Rr,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [Self::Fifo, Self::Lifo, Self::Lru, Self::Mru, Self::Rr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::Lifo => "lifo",
            Self::Lru => "lru",
            Self::Mru => "mru",
            Self::Rr => "rr",
        }
    }

    /// Whether a successful `get` changes the eviction order
    pub fn is_access_ordered(&self) -> bool {
        matches!(self, Self::Lru | Self::Mru)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "lifo" => Ok(Self::Lifo),
            "lru" => Ok(Self::Lru),
            "mru" => Ok(Self::Mru),
            "rr" | "random" => Ok(Self::Rr),
            other => Err(ConfigurationError::UnknownCachePolicy {
                name: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PolicyKind {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Internal policy enum for zero-cost dispatch
///
/// This is an implementation detail. Consumers pick a [`PolicyKind`].
#[derive(Debug)]
pub(crate) enum PolicyBackend {
    Fifo(FifoPolicy),
    Lifo(LifoPolicy),
    Lru(LruPolicy),
    Mru(MruPolicy),
    Rr(RandomReplacementPolicy),
}

impl PolicyBackend {
    pub(crate) fn new(kind: PolicyKind, seed: Option<u64>) -> Self {
        match kind {
            PolicyKind::Fifo => Self::Fifo(FifoPolicy),
            PolicyKind::Lifo => Self::Lifo(LifoPolicy),
            PolicyKind::Lru => Self::Lru(LruPolicy),
            PolicyKind::Mru => Self::Mru(MruPolicy),
            PolicyKind::Rr => Self::Rr(match seed {
                Some(seed) => RandomReplacementPolicy::with_seed(seed),
                None => RandomReplacementPolicy::new(),
            }),
        }
    }

    fn as_policy(&mut self) -> &mut dyn EvictionPolicy {
        match self {
            Self::Fifo(p) => p,
            Self::Lifo(p) => p,
            Self::Lru(p) => p,
            Self::Mru(p) => p,
            Self::Rr(p) => p,
        }
    }

    pub(crate) fn on_insert(&mut self, order: &mut RecencyList, slot: usize) {
        self.as_policy().on_insert(order, slot);
    }

    pub(crate) fn on_access(&mut self, order: &mut RecencyList, slot: usize) {
        self.as_policy().on_access(order, slot);
    }

    pub(crate) fn on_overwrite(&mut self, order: &mut RecencyList, slot: usize) {
        self.as_policy().on_overwrite(order, slot);
    }

    pub(crate) fn choose_victim(&mut self, order: &RecencyList) -> Option<usize> {
        self.as_policy().choose_victim(order)
    }

    pub(crate) fn policy_name(&mut self) -> &'static str {
        self.as_policy().policy_name()
    }
}
