//! # Result Cache Module
//!
//! Bounded caches that let the dispatcher reuse previously computed task
//! results instead of executing the task again.
//!
//! ## Architecture
//!
//! ```text
//! CacheRegistry                 <- partitions caches by CacheScope
//!   └── ResultCache<K, V>       <- one mutex, fixed capacity
//!         ├── RecencyList       <- O(1) ordered index with sequence ranks
//!         └── PolicyBackend     <- enum dispatch over the built-in policies
//!               ├── Fifo / Lifo (insertion order)
//!               ├── Lru  / Mru  (use order)
//!               └── Rr          (no order, uniform victim)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use taskflow_core::cache::{CacheError, PolicyKind, ResultCache};
//!
//! let cache = ResultCache::new(PolicyKind::Lru, 1).unwrap();
//! cache.add("a", 1);
//! cache.add("b", 2);
//!
//! assert_eq!(cache.get(&"a"), Err(CacheError::Miss));
//! assert_eq!(cache.get(&"b"), Ok(2));
//! ```

pub mod errors;
pub mod ordering;
pub mod policies;
pub mod policy;
pub mod registry;
pub mod result_cache;

pub use errors::{CacheError, CacheResult};
pub use ordering::RecencyList;
pub use policy::{EvictionPolicy, PolicyKind};
pub use registry::{CacheNamespace, CacheRegistry, CacheScope, ResultKey};
pub use result_cache::{CacheEntry, CacheStats, ResultCache};
