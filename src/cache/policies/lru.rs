//! Least-recently-used eviction

use crate::cache::ordering::RecencyList;
use crate::cache::policy::EvictionPolicy;

/// Evicts the entry whose last use is the oldest
///
/// Insertion, reads and overwrites all count as a use.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruPolicy;

impl EvictionPolicy for LruPolicy {
    fn on_access(&mut self, order: &mut RecencyList, slot: usize) {
        order.touch(slot);
    }

    fn on_overwrite(&mut self, order: &mut RecencyList, slot: usize) {
        order.touch(slot);
    }

    fn choose_victim(&mut self, order: &RecencyList) -> Option<usize> {
        order.oldest()
    }

    fn policy_name(&self) -> &'static str {
        "lru"
    }
}
