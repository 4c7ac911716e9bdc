//! Most-recently-used eviction

use crate::cache::ordering::RecencyList;
use crate::cache::policy::EvictionPolicy;

#[derive(Debug, Clone, Copy, Default)]
pub struct MruPolicy;

impl EvictionPolicy for MruPolicy {
    fn on_access(&mut self, order: &mut RecencyList, slot: usize) {
        order.touch(slot);
    }

    fn on_overwrite(&mut self, order: &mut RecencyList, slot: usize) {
        order.touch(slot);
    }

    fn choose_victim(&mut self, order: &RecencyList) -> Option<usize> {
        order.newest()
    }

    fn policy_name(&self) -> &'static str {
        "mru"
    }
}
